//! Delivery of finished exports

use super::document::ExportDocument;
use crate::error::{ExportError, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content type of a delivered export
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Characters never allowed in a delivered filename
const FILENAME_SPECIAL_CHARS: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '%', '+', '\u{a0}', '\u{ad}',
];

/// Receives a finished export
pub trait OutputSink {
    /// Serialize and deliver `document` under `filename`
    fn deliver(&self, document: &ExportDocument, filename: &str) -> Result<()>;
}

/// Pretty JSON with four-space indentation.
///
/// Non-ASCII characters and forward slashes are written as-is.
pub fn render_json(document: &ExportDocument) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;

    String::from_utf8(buf)
        .map_err(|e| ExportError::Validation(format!("Export is not UTF-8: {}", e)))
}

/// Make a filename safe to hand to a browser or file system
pub fn sanitize_file_name(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| !FILENAME_SPECIAL_CHARS.contains(c) && !c.is_control())
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches(|c| c == '.' || c == '-' || c == '_');
    if trimmed.is_empty() {
        "export.json".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `Content-Disposition` header value for an export download
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename={}", sanitize_file_name(filename))
}

/// Writes exports into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path an export named `filename` is written to
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(sanitize_file_name(filename))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for FileSink {
    fn deliver(&self, document: &ExportDocument, filename: &str) -> Result<()> {
        let json = render_json(document)?;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        let final_path = self.path_for(filename);
        write_atomically(&final_path, json.as_bytes()).map_err(|e| {
            ExportError::Io(e).with_context(format!("Failed to write {}", final_path.display()))
        })?;

        debug!("Wrote export to {:?}", final_path);
        Ok(())
    }
}

/// Write through a temp file and rename; the temp file never outlives a failure
fn write_atomically(final_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = final_path.with_extension("tmp");

    let result = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.flush()
        })
        .and_then(|()| fs::rename(&temp_path, final_path));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Writes exports to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn deliver(&self, document: &ExportDocument, filename: &str) -> Result<()> {
        let json = render_json(document)?;
        debug!("Writing {} to stdout", sanitize_file_name(filename));

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(json.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{
        ContentFormat, ExportMetadata, ExportOptionsSummary, ExportRecord,
    };
    use crate::types::ExportType;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn document() -> ExportDocument {
        ExportDocument {
            metadata: ExportMetadata {
                export_date: "2025-01-31 09:04:05".into(),
                site_title: "Café Ünïcode".into(),
                site_url: "https://example.com/blog".into(),
                post_count: 1,
                export_options: ExportOptionsSummary {
                    llm_friendly: true,
                    custom_excerpts_only: false,
                    export_type: ExportType::All,
                    category_id: None,
                },
                platform_version: "6.7".into(),
                plugin_version: "0.1.0".into(),
            },
            posts: vec![ExportRecord {
                id: 1,
                title: "Grüße".into(),
                date: "2025-01-30".into(),
                slug: "grusse".into(),
                content: "Hello **world**".into(),
                author: "Ada".into(),
                url: "https://example.com/blog/grusse/".into(),
                word_count: 2,
                format: ContentFormat::LlmFriendly,
                excerpt: Some("Hello world".into()),
                categories: Vec::new(),
                tags: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_render_json_format() {
        let json = render_json(&document()).unwrap();

        assert!(json.starts_with("{\n    \"metadata\": {\n        \"export_date\""));
        assert!(json.contains("\"site_title\": \"Café Ünïcode\""));
        assert!(json.contains("\"url\": \"https://example.com/blog/grusse/\""));
        assert!(json.contains("\"category_id\": null"));
        assert!(!json.contains("\\/"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_render_json_parses_back() {
        let json = render_json(&document()).unwrap();
        let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("calm-notes-export-all-2025-01-31-090405.json"),
            "calm-notes-export-all-2025-01-31-090405.json"
        );
        assert_eq!(sanitize_file_name("my export?<1>.json"), "my-export1.json");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_name("///"), "export.json");
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("site export.json"),
            "attachment; filename=site-export.json"
        );
        assert_eq!(CONTENT_TYPE, "application/json; charset=utf-8");
    }

    #[test]
    fn test_file_sink_failure_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path());

        // A non-empty directory where the export should go makes the rename fail
        let blocked = sink.path_for("site-export-all.json");
        fs::create_dir_all(blocked.join("occupied")).unwrap();

        let result = sink.deliver(&document(), "site-export-all.json");
        assert!(result.is_err());
        assert!(!blocked.with_extension("tmp").exists());
        assert!(blocked.is_dir());
    }

    #[test]
    fn test_write_atomically_cleans_up_after_write_error() {
        let temp = TempDir::new().unwrap();
        let final_path = temp.path().join("missing-dir").join("out.json");

        assert!(write_atomically(&final_path, b"{}").is_err());
        assert!(!final_path.with_extension("tmp").exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn test_file_sink_writes_atomically() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("out"));

        sink.deliver(&document(), "site-export-all.json").unwrap();

        let path = sink.path_for("site-export-all.json");
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"posts\""));
    }
}
