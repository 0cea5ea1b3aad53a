//! Per-post record building

use super::document::{ContentFormat, ExportRecord};
use super::options::ExportOptions;
use super::render::{ContentRenderer, RawContent};
use crate::convert::{
    decode_entities, escape_html, sanitize_title, trim_words, word_count, MarkupConverter,
};
use crate::types::ContentItem;
use tracing::debug;

/// Words kept in a generated excerpt
pub const EXCERPT_WORD_LIMIT: usize = 55;

/// Marker appended to a generated excerpt that was cut short
pub const EXCERPT_MORE: &str = " ...";

/// Shapes a [`ContentItem`] into an [`ExportRecord`]
pub struct RecordBuilder {
    converter: MarkupConverter,
    renderer: Box<dyn ContentRenderer>,
    site_url: String,
}

impl RecordBuilder {
    /// Create a builder resolving relative permalinks against `site_url`
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            converter: MarkupConverter::new(),
            renderer: Box::new(RawContent),
            site_url: site_url.into(),
        }
    }

    /// Set the body rendering pipeline
    pub fn with_renderer(mut self, renderer: Box<dyn ContentRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the markup converter
    pub fn with_converter(mut self, converter: MarkupConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Build the record for one post
    pub fn build(&self, item: &ContentItem, options: &ExportOptions) -> ExportRecord {
        let body = self.renderer.render(&item.content);

        let include_excerpt = !options.custom_excerpts_only || item.has_custom_excerpt();
        let excerpt = include_excerpt.then(|| match item.custom_excerpt() {
            Some(custom) => custom.to_string(),
            // Back to markup so both formats read the words the body shows
            None => escape_html(&trim_words(&item.content, EXCERPT_WORD_LIMIT, EXCERPT_MORE)),
        });

        let word_count = word_count(&body);

        let (content, excerpt, format) = if options.llm_friendly {
            (
                self.converter.convert(&body),
                excerpt.map(|e| self.converter.convert(&e)),
                ContentFormat::LlmFriendly,
            )
        } else {
            (body, excerpt, ContentFormat::Html)
        };

        debug!(
            "Built record for post {} ({} words, excerpt: {})",
            item.id,
            word_count,
            excerpt.is_some()
        );

        ExportRecord {
            id: item.id.0,
            title: decode_entities(&item.title),
            date: item.date.format("%Y-%m-%d").to_string(),
            slug: sanitize_title(&item.slug),
            content,
            author: item.author.clone(),
            url: resolve_url(&self.site_url, &item.permalink, item.id.0),
            word_count,
            format,
            excerpt: excerpt.filter(|e| !e.is_empty()),
            categories: item.categories.clone(),
            tags: item.tags.clone(),
        }
    }
}

/// Absolute URL for a permalink; posts without one get the `?p=<id>` form
pub fn resolve_url(site_url: &str, permalink: &str, id: u64) -> String {
    let base = site_url.trim_end_matches('/');
    let permalink = permalink.trim();

    if permalink.is_empty() {
        format!("{}/?p={}", base, id)
    } else if permalink.starts_with("http://") || permalink.starts_with("https://") {
        permalink.to_string()
    } else if let Some(rest) = permalink.strip_prefix("//") {
        let scheme = base.split("://").next().unwrap_or("https");
        format!("{}://{}", scheme, rest)
    } else {
        format!("{}/{}", base, permalink.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::render::AutoParagraph;
    use crate::types::TermRef;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn item(content: &str) -> ContentItem {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        ContentItem::new(12, "Tips &amp; Tricks", content, date)
            .with_author("Ada Lovelace")
            .with_slug("tips-and-tricks")
            .with_permalink("/2024/03/tips-and-tricks/")
    }

    fn builder() -> RecordBuilder {
        RecordBuilder::new("https://example.com/")
    }

    #[test]
    fn test_llm_friendly_record() {
        let options = ExportOptions::new().llm_friendly(true);
        let record = builder().build(&item("<p>Hello <b>world</b></p>"), &options);

        assert_eq!(record.content, "Hello **world**");
        assert_eq!(record.word_count, 2);
        assert_eq!(record.format, ContentFormat::LlmFriendly);
        assert_eq!(record.excerpt.as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_html_record() {
        let record = builder().build(&item("<p>Hello <b>world</b></p>"), &ExportOptions::new());

        assert_eq!(record.id, 12);
        assert_eq!(record.title, "Tips & Tricks");
        assert_eq!(record.date, "2024-03-09");
        assert_eq!(record.slug, "tips-and-tricks");
        assert_eq!(record.content, "<p>Hello <b>world</b></p>");
        assert_eq!(record.author, "Ada Lovelace");
        assert_eq!(record.url, "https://example.com/2024/03/tips-and-tricks/");
        assert_eq!(record.format, ContentFormat::Html);
        assert_eq!(record.excerpt.as_deref(), Some("Hello world"));
    }

    #[test]
    fn test_word_count_independent_of_format() {
        let body = "<h2>Intro</h2><p>Some <em>rich</em> text with a <a href=\"/x\">link</a>.</p>";
        let html = builder().build(&item(body), &ExportOptions::new());
        let llm = builder().build(&item(body), &ExportOptions::new().llm_friendly(true));

        assert_eq!(html.word_count, llm.word_count);
        assert_eq!(html.word_count, 7);
    }

    #[test]
    fn test_custom_excerpts_only_omits_generated_excerpt() {
        let options = ExportOptions::new().custom_excerpts_only(true);
        let record = builder().build(&item("<p>Body</p>"), &options);
        assert_eq!(record.excerpt, None);

        let json = serde_json::to_value(&record).unwrap();
        assert!(!json.as_object().unwrap().contains_key("excerpt"));
    }

    #[test]
    fn test_custom_excerpt_is_kept() {
        let options = ExportOptions::new().custom_excerpts_only(true);
        let post = item("<p>Body</p>").with_excerpt("Written by <em>hand</em>");

        let record = builder().build(&post, &options);
        assert_eq!(record.excerpt.as_deref(), Some("Written by <em>hand</em>"));

        let record = builder().build(&post, &options.llm_friendly(true));
        assert_eq!(record.excerpt.as_deref(), Some("Written by *hand*"));
    }

    #[test]
    fn test_generated_excerpt_is_trimmed() {
        let body = format!(
            "<p>{}</p>",
            (1..=80).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
        );
        let record = builder().build(&item(&body), &ExportOptions::new());
        let excerpt = record.excerpt.unwrap();

        assert!(excerpt.ends_with("word55 ..."));
        assert!(!excerpt.contains("word56"));
        assert_eq!(record.word_count, 80);
    }

    #[test]
    fn test_generated_excerpt_keeps_escaped_text() {
        let body = concat!(
            "<p>Wrap it in a &lt;div&gt; element and ",
            "&lt;script&gt;alert(1)&lt;/script&gt; done</p>"
        );

        let html = builder().build(&item(body), &ExportOptions::new());
        assert_eq!(
            html.excerpt.as_deref(),
            Some("Wrap it in a &lt;div&gt; element and &lt;script&gt;alert(1)&lt;/script&gt; done")
        );

        let llm = builder().build(&item(body), &ExportOptions::new().llm_friendly(true));
        assert_eq!(
            llm.content,
            "Wrap it in a <div> element and <script>alert(1)</script> done"
        );
        assert_eq!(llm.excerpt.as_deref(), Some(llm.content.as_str()));
    }

    #[test]
    fn test_generated_excerpt_keeps_ampersands_and_stray_brackets() {
        let body = "<p>Fish &amp; chips cost &lt; 5 &gt; 3</p>";

        let html = builder().build(&item(body), &ExportOptions::new());
        assert_eq!(html.excerpt.as_deref(), Some("Fish &amp; chips cost &lt; 5 &gt; 3"));

        let llm = builder().build(&item(body), &ExportOptions::new().llm_friendly(true));
        assert_eq!(llm.excerpt.as_deref(), Some("Fish & chips cost < 5 > 3"));
    }

    #[test]
    fn test_empty_body_has_no_excerpt_key() {
        let record = builder().build(&item(""), &ExportOptions::new());
        assert_eq!(record.excerpt, None);
        assert_eq!(record.word_count, 0);
    }

    #[test]
    fn test_terms_are_attached_only_when_present() {
        let post = item("<p>x</p>").with_tag(TermRef::new(3, "News", "news"));
        let record = builder().build(&post, &ExportOptions::new());

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("categories"));
        assert_eq!(json["tags"].as_array().unwrap().len(), 1);
        assert_eq!(json["tags"][0]["slug"], "news");
    }

    #[test]
    fn test_renderer_feeds_word_count_and_content() {
        let builder = builder().with_renderer(Box::new(AutoParagraph));
        let record = builder.build(&item("One two\n\nthree"), &ExportOptions::new());

        assert_eq!(record.content, "<p>One two</p>\n<p>three</p>");
        assert_eq!(record.word_count, 3);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://example.com", "https://cdn.example.com/a", 1),
            "https://cdn.example.com/a"
        );
        assert_eq!(resolve_url("https://example.com/", "/a/b/", 1), "https://example.com/a/b/");
        assert_eq!(resolve_url("https://example.com", "a", 1), "https://example.com/a");
        assert_eq!(resolve_url("https://example.com", "", 9), "https://example.com/?p=9");
        assert_eq!(resolve_url("http://example.com", "//example.com/x", 1), "http://example.com/x");
    }
}
