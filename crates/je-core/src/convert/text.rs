//! Plain-text helpers over HTML markup.
//!
//! Tag stripping, entity decoding, word counting and trimming, and slug
//! sanitizing. All of them are total: malformed markup yields best-effort text.

use scraper::{Html, Node};

/// Elements whose text never counts as content
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Elements that separate words even without surrounding whitespace
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

pub(crate) fn is_hidden(name: &str) -> bool {
    HIDDEN_ELEMENTS.contains(&name)
}

pub(crate) fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Remove all tags, keeping text content.
///
/// Entities are decoded, `script`/`style` content is dropped and block
/// boundaries become a space so adjacent paragraphs do not merge words.
pub fn strip_tags(markup: &str) -> String {
    if !markup.contains('<') && !markup.contains('&') {
        return markup.trim().to_string();
    }

    let fragment = Html::parse_fragment(markup);
    let mut text = String::with_capacity(markup.len());

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Element(element) if is_block(element.name()) => text.push(' '),
            Node::Text(chunk) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map(|el| is_hidden(el.name()))
                        .unwrap_or(false)
                });
                if !hidden {
                    text.push_str(chunk);
                }
            }
            _ => {}
        }
    }

    text.trim().to_string()
}

/// Resolve HTML entities (`&amp;`, `&#8217;`, `&quot;` ...) to characters
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let fragment = Html::parse_fragment(text);
    fragment.root_element().text().collect()
}

/// Count whitespace-delimited words in the plain text of `markup`
pub fn word_count(markup: &str) -> usize {
    strip_tags(markup).split_whitespace().count()
}

/// Keep the first `limit` words of the plain text of `markup`.
///
/// Whitespace is normalized to single spaces. `more` is appended only when
/// words were actually dropped.
pub fn trim_words(markup: &str, limit: usize, more: &str) -> String {
    let plain = strip_tags(markup);
    let words: Vec<&str> = plain.split_whitespace().collect();

    if words.len() > limit {
        let mut trimmed = words[..limit].join(" ");
        trimmed.push_str(more);
        trimmed
    } else {
        words.join(" ")
    }
}

/// Escape `&`, `<` and `>` so plain text can sit inside markup again
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Turn arbitrary text into a lowercase, hyphen-separated slug.
///
/// # Examples
///
/// ```
/// use je_core::convert::sanitize_title;
///
/// assert_eq!(sanitize_title("Hello, World!"), "hello-world");
/// assert_eq!(sanitize_title("  Tips &amp; Tricks  "), "tips-tricks");
/// ```
pub fn sanitize_title(text: &str) -> String {
    strip_tags(text)
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else if c.is_whitespace() || c == '-' || c == '_' || c == '.' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
