//! Body rendering applied before records are built

use crate::convert::is_block_tag;

/// Rendering pipeline a post body passes through before export.
///
/// Word counts and Markdown conversion both see the rendered body.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, content: &str) -> String;
}

/// Leaves the body untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct RawContent;

impl ContentRenderer for RawContent {
    fn render(&self, content: &str) -> String {
        content.to_string()
    }
}

/// Wraps bare text blocks in paragraphs.
///
/// Blocks are separated by blank lines. A block already starting with a
/// block-level tag or an HTML comment is kept as-is; otherwise it becomes a
/// `<p>` with single newlines turned into `<br />`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoParagraph;

impl ContentRenderer for AutoParagraph {
    fn render(&self, content: &str) -> String {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

        normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                if starts_with_block(block) {
                    block.to_string()
                } else {
                    format!("<p>{}</p>", block.replace('\n', "<br />\n"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn starts_with_block(block: &str) -> bool {
    let Some(rest) = block.strip_prefix('<') else {
        return false;
    };
    if rest.starts_with("!--") {
        return true;
    }

    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    is_block_tag(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_content_is_identity() {
        assert_eq!(RawContent.render("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_wraps_bare_text() {
        assert_eq!(
            AutoParagraph.render("First line\nsecond line\n\nNext block"),
            "<p>First line<br />\nsecond line</p>\n<p>Next block</p>"
        );
    }

    #[test]
    fn test_keeps_block_markup() {
        let html = "<p>Hello <b>world</b></p>";
        assert_eq!(AutoParagraph.render(html), html);

        let html = "<!-- wp:paragraph -->\n<p>Block</p>\n<!-- /wp:paragraph -->";
        assert_eq!(AutoParagraph.render(html), html);
    }

    #[test]
    fn test_inline_markup_is_wrapped() {
        assert_eq!(
            AutoParagraph.render("<strong>Bold</strong> start\r\n\r\n<h2>Title</h2>"),
            "<p><strong>Bold</strong> start</p>\n<h2>Title</h2>"
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(AutoParagraph.render("  \n\n "), "");
    }
}
