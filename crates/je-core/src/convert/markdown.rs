//! HTML to Markdown conversion.
//!
//! Walks the parsed DOM with `scraper` and renders each element as its
//! Markdown counterpart. Unknown elements are unwrapped, so whatever the
//! markup looks like the text survives.

use super::text::{is_hidden, strip_tags};
use crate::error::{ExportError, Result};
use scraper::{ElementRef, Html, Node};
use tracing::warn;

/// Deepest element nesting rendered before giving up on structure
const MAX_DEPTH: usize = 256;

/// Converts rich post markup into simplified Markdown
#[derive(Debug, Clone)]
pub struct MarkupConverter {
    max_depth: usize,
}

impl MarkupConverter {
    /// Create a new converter
    pub fn new() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Convert markup to Markdown, never failing.
    ///
    /// When the structure cannot be rendered the stripped plain text is
    /// returned instead.
    pub fn convert(&self, markup: &str) -> String {
        match self.try_convert(markup) {
            Ok(markdown) => markdown,
            Err(e) => {
                warn!("Falling back to plain text: {}", e);
                strip_tags(markup)
            }
        }
    }

    /// Convert markup to Markdown, reporting [`ExportError::ConversionDegraded`]
    pub fn try_convert(&self, markup: &str) -> Result<String> {
        if markup.trim().is_empty() {
            return Ok(String::new());
        }

        let fragment = Html::parse_fragment(markup);
        let mut writer = Writer::default();
        self.render_children(fragment.root_element(), &mut writer, 0)?;

        Ok(clean_blank_lines(&writer.buf))
    }

    /// Count words in the plain text of `markup`
    pub fn word_count(&self, markup: &str) -> usize {
        super::text::word_count(markup)
    }

    fn render_children(&self, element: ElementRef, out: &mut Writer, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(ExportError::ConversionDegraded(format!(
                "element nesting deeper than {}",
                self.max_depth
            )));
        }

        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child_ref) = ElementRef::wrap(child) {
                        self.render_element(child_ref, out, depth + 1)?;
                    }
                }
                Node::Text(text) => out.push_text(text),
                _ => {}
            }
        }
        Ok(())
    }

    /// Render children into a fresh buffer
    fn render_nested(&self, element: ElementRef, depth: usize) -> Result<String> {
        let mut inner = Writer::default();
        self.render_children(element, &mut inner, depth)?;
        Ok(inner.buf)
    }

    fn render_element(&self, element: ElementRef, out: &mut Writer, depth: usize) -> Result<()> {
        let tag = element.value().name();

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let inner = self.render_nested(element, depth)?;
                let heading = inner.split_whitespace().collect::<Vec<_>>().join(" ");
                if !heading.is_empty() {
                    out.block_break();
                    out.push_raw(&"#".repeat(level));
                    out.push_raw(" ");
                    out.push_raw(&heading);
                    out.block_break();
                }
            }

            "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "aside"
            | "nav" | "figure" | "figcaption" | "address" | "dl" | "dt" | "dd" | "details"
            | "summary" => {
                out.block_break();
                self.render_children(element, out, depth)?;
                out.block_break();
            }

            "br" => out.push_raw("  \n"),

            "hr" => {
                out.block_break();
                out.push_raw("---");
                out.block_break();
            }

            "strong" | "b" => self.render_wrapped(element, out, depth, "**")?,
            "em" | "i" | "cite" => self.render_wrapped(element, out, depth, "*")?,
            "del" | "s" | "strike" => self.render_wrapped(element, out, depth, "~~")?,

            "code" => {
                let code: String = element.text().collect();
                if !code.is_empty() {
                    let ticks = "`".repeat(longest_run(&code, '`') + 1);
                    let pad = if code.starts_with('`') || code.ends_with('`') { " " } else { "" };
                    out.push_raw(&format!("{ticks}{pad}{code}{pad}{ticks}"));
                }
            }

            "pre" => {
                let code: String = element.text().collect();
                let language = code_language(element).unwrap_or_default();
                let fence = "`".repeat((longest_run(&code, '`') + 1).max(3));
                out.block_break();
                out.push_raw(&format!("{fence}{language}\n"));
                out.push_raw(code.trim_end_matches('\n'));
                out.push_raw(&format!("\n{fence}"));
                out.block_break();
            }

            "ul" | "ol" => {
                let list = self.render_list(element, tag == "ol", depth)?;
                if !list.is_empty() {
                    out.block_break();
                    out.push_raw(&list);
                    out.block_break();
                }
            }

            "li" => {
                // Stray item outside a list
                let item = self.render_nested(element, depth)?;
                out.block_break();
                out.push_raw(&indent_item("- ", item.trim()));
                out.block_break();
            }

            "a" => self.render_link(element, out, depth)?,

            "img" => {
                let attrs = element.value();
                if let Some(src) = attrs.attr("src").filter(|s| !s.is_empty()) {
                    let alt = attrs.attr("alt").unwrap_or_default();
                    out.push_raw(&format!(
                        "![{}]({}{})",
                        escape_text(alt),
                        src,
                        title_suffix(attrs.attr("title"))
                    ));
                }
            }

            "blockquote" => {
                let inner = clean_blank_lines(&self.render_nested(element, depth)?);
                if !inner.is_empty() {
                    let quoted = inner
                        .lines()
                        .map(|line| {
                            if line.is_empty() {
                                ">".to_string()
                            } else {
                                format!("> {}", line)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    out.block_break();
                    out.push_raw(&quoted);
                    out.block_break();
                }
            }

            "table" => {
                let table = self.render_table(element, depth)?;
                if !table.is_empty() {
                    out.block_break();
                    out.push_raw(&table);
                    out.block_break();
                }
            }

            name if is_hidden(name) => {}
            "iframe" | "object" | "embed" | "svg" | "canvas" | "meta" | "link" | "input"
            | "button" | "select" | "textarea" => {}

            _ => self.render_children(element, out, depth)?,
        }

        Ok(())
    }

    /// Inline emphasis: markers hug the content, surrounding spaces stay outside
    fn render_wrapped(
        &self,
        element: ElementRef,
        out: &mut Writer,
        depth: usize,
        marker: &str,
    ) -> Result<()> {
        let inner = self.render_nested(element, depth)?;
        let content = inner.trim();

        if content.is_empty() {
            if !inner.is_empty() {
                out.push_space();
            }
            return Ok(());
        }

        if inner.starts_with(char::is_whitespace) {
            out.push_space();
        }
        out.push_raw(marker);
        out.push_raw(content);
        out.push_raw(marker);
        if inner.ends_with(char::is_whitespace) {
            out.push_space();
        }
        Ok(())
    }

    fn render_link(&self, element: ElementRef, out: &mut Writer, depth: usize) -> Result<()> {
        let href = element.value().attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() {
            return self.render_children(element, out, depth);
        }

        let inner = self.render_nested(element, depth)?;
        let text = inner.trim();

        if inner.starts_with(char::is_whitespace) {
            out.push_space();
        }
        if text.is_empty() || text == escape_text(href) {
            out.push_raw(&format!("<{}>", href));
        } else {
            out.push_raw(&format!(
                "[{}]({}{})",
                text,
                href,
                title_suffix(element.value().attr("title"))
            ));
        }
        if inner.ends_with(char::is_whitespace) {
            out.push_space();
        }
        Ok(())
    }

    fn render_list(&self, element: ElementRef, ordered: bool, depth: usize) -> Result<String> {
        let mut number = element
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let mut items = Vec::new();

        for child in element.children().filter_map(ElementRef::wrap) {
            if child.value().name() != "li" {
                continue;
            }

            let marker = if ordered {
                let marker = format!("{}. ", number);
                number = number.saturating_add(1);
                marker
            } else {
                "- ".to_string()
            };

            let body = clean_blank_lines(&self.render_nested(child, depth + 1)?);
            items.push(indent_item(&marker, &body));
        }

        Ok(items.join("\n"))
    }

    fn render_table(&self, element: ElementRef, depth: usize) -> Result<String> {
        let mut rows = Vec::new();
        for row in table_rows(element) {
            let mut cells = Vec::new();
            for cell in row.children().filter_map(ElementRef::wrap) {
                if matches!(cell.value().name(), "td" | "th") {
                    let text = self.render_nested(cell, depth + 2)?;
                    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    cells.push(text.replace('|', "\\|"));
                }
            }
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        let Some(columns) = rows.iter().map(Vec::len).max() else {
            return Ok(String::new());
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (index, mut row) in rows.into_iter().enumerate() {
            row.resize(columns, String::new());
            lines.push(format!("| {} |", row.join(" | ")));
            if index == 0 {
                lines.push(format!("|{}", " --- |".repeat(columns)));
            }
        }
        Ok(lines.join("\n"))
    }
}

impl Default for MarkupConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Output buffer tracking whitespace between inline runs
#[derive(Debug, Default)]
struct Writer {
    buf: String,
}

impl Writer {
    fn push_raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn push_space(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with(' ') && !self.buf.ends_with('\n') {
            self.buf.push(' ');
        }
    }

    /// Append a text node, collapsing whitespace
    fn push_text(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() {
                self.push_space();
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.push_space();
        }
        let at_line_start = self.buf.is_empty() || self.buf.ends_with('\n');
        let mut escaped = escape_text(&words.join(" "));
        if at_line_start && escaped.starts_with('#') {
            escaped.insert(0, '\\');
        }
        self.buf.push_str(&escaped);
        if text.ends_with(char::is_whitespace) {
            self.push_space();
        }
    }

    /// Terminate the current block with a blank line
    fn block_break(&mut self) {
        let trimmed = self.buf.trim_end_matches([' ', '\n']).len();
        self.buf.truncate(trimmed);
        if !self.buf.is_empty() {
            self.buf.push_str("\n\n");
        }
    }
}

/// Escape characters Markdown would otherwise interpret
fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 10);
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

fn title_suffix(title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!(" \"{}\"", title.replace('"', "\\\"")),
        None => String::new(),
    }
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Language hint from `class="language-x"` on a `pre` or its `code` child
fn code_language(pre: ElementRef) -> Option<String> {
    let from_classes = |el: ElementRef| {
        el.value()
            .classes()
            .find_map(|class| class.strip_prefix("language-").map(str::to_string))
    };

    from_classes(pre).or_else(|| {
        pre.children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code")
            .and_then(from_classes)
    })
}

/// Prefix the first line with the marker and indent the rest to match
fn indent_item(marker: &str, body: &str) -> String {
    let padding = " ".repeat(marker.len());
    let mut lines = body.lines();
    let mut item = format!("{}{}", marker, lines.next().unwrap_or_default());
    for line in lines {
        item.push('\n');
        if !line.is_empty() {
            item.push_str(&padding);
            item.push_str(line);
        }
    }
    item.trim_end().to_string()
}

fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Collapse runs of blank lines and trim the ends
fn clean_blank_lines(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                result.push(c);
            }
        } else {
            newlines = 0;
            result.push(c);
        }
    }
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(html: &str) -> String {
        MarkupConverter::new().convert(html)
    }

    #[test]
    fn test_paragraph_with_bold() {
        assert_eq!(convert("<p>Hello <b>world</b></p>"), "Hello **world**");
    }

    #[test]
    fn test_paragraphs_are_separated() {
        let html = "<p>First <em>one</em>.</p>\n<p>Second one.</p>";
        assert_eq!(convert(html), "First *one*.\n\nSecond one.");
    }

    #[test]
    fn test_headings() {
        let html = "<h1>Main Title</h1><h2>Sub <i>title</i></h2><p>Body</p>";
        assert_eq!(convert(html), "# Main Title\n\n## Sub *title*\n\nBody");
    }

    #[test]
    fn test_links_and_images() {
        let html = r#"<p>See <a href="https://example.com/docs" title="Docs">the docs</a>
            and <img src="/img/cat.png" alt="A cat"></p>"#;
        assert_eq!(
            convert(html),
            "See [the docs](https://example.com/docs \"Docs\") and ![A cat](/img/cat.png)"
        );
    }

    #[test]
    fn test_bare_link() {
        let html = r#"<a href="https://example.com">https://example.com</a>"#;
        assert_eq!(convert(html), "<https://example.com>");
    }

    #[test]
    fn test_link_without_href_is_unwrapped() {
        assert_eq!(convert("<a name=\"top\">Top</a>"), "Top");
    }

    #[test]
    fn test_unordered_list() {
        let html = "<ul><li>One</li><li>Two <strong>bold</strong></li></ul>";
        assert_eq!(convert(html), "- One\n- Two **bold**");
    }

    #[test]
    fn test_ordered_list_with_start() {
        let html = r#"<ol start="3"><li>Three</li><li>Four</li></ol>"#;
        assert_eq!(convert(html), "3. Three\n4. Four");
    }

    #[test]
    fn test_ordered_list_start_at_numeric_limit() {
        let html = r#"<ol start="9223372036854775807"><li>Max</li><li>Past</li></ol>"#;
        assert_eq!(
            convert(html),
            "9223372036854775807. Max\n9223372036854775807. Past"
        );
    }

    #[test]
    fn test_nested_list() {
        let html = "<ul><li>Parent<ul><li>Child</li></ul></li><li>Sibling</li></ul>";
        assert_eq!(convert(html), "- Parent\n\n  - Child\n- Sibling");
    }

    #[test]
    fn test_blockquote() {
        let html = "<blockquote><p>Quoted</p><p>Twice</p></blockquote>";
        assert_eq!(convert(html), "> Quoted\n>\n> Twice");
    }

    #[test]
    fn test_code() {
        assert_eq!(convert("<p>Run <code>cargo_test</code></p>"), "Run `cargo_test`");

        let html = "<pre><code class=\"language-rust\">fn main() {\n    *x = 1;\n}\n</code></pre>";
        assert_eq!(convert(html), "```rust\nfn main() {\n    *x = 1;\n}\n```");
    }

    #[test]
    fn test_horizontal_rule_and_break() {
        assert_eq!(convert("<p>a<br>b</p><hr><p>c</p>"), "a  \nb\n\n---\n\nc");
    }

    #[test]
    fn test_table() {
        let html = "<table><thead><tr><th>Name</th><th>Qty</th></tr></thead>\
                    <tbody><tr><td>Apple</td><td>3</td></tr></tbody></table>";
        assert_eq!(convert(html), "| Name | Qty |\n| --- | --- |\n| Apple | 3 |");
    }

    #[test]
    fn test_escapes_markdown_in_text() {
        assert_eq!(convert("<p>2 * 3 and snake_case</p>"), "2 \\* 3 and snake\\_case");
        assert_eq!(convert("<p>#hashtag</p>"), "\\#hashtag");
    }

    #[test]
    fn test_drops_scripts_and_styles() {
        let html = "<p>Keep</p><script>alert(1)</script><style>p { color: red }</style>";
        assert_eq!(convert(html), "Keep");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(convert("<p>Tom &amp; Jerry&#8217;s</p>"), "Tom & Jerry\u{2019}s");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(convert("Hello world ..."), "Hello world ...");
        assert_eq!(convert("   "), "");
    }

    #[test]
    fn test_malformed_markup() {
        assert_eq!(convert("<p>Unclosed <b>bold"), "Unclosed **bold**");
        assert_eq!(convert("</div>stray close"), "stray close");
    }

    #[test]
    fn test_deep_nesting_degrades_to_plain_text() {
        let converter = MarkupConverter::new().with_max_depth(4);
        let html = format!("{}<b>deep</b> text{}", "<div>".repeat(6), "</div>".repeat(6));

        assert!(matches!(
            converter.try_convert(&html),
            Err(ExportError::ConversionDegraded(_))
        ));
        assert_eq!(converter.convert(&html), "deep text");
    }

    #[test]
    fn test_word_count_ignores_conversion() {
        let converter = MarkupConverter::new();
        assert_eq!(converter.word_count("<p>Hello <b>world</b></p>"), 2);
    }
}
