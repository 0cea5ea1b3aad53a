//! Export document structure

use crate::types::{ExportType, TermRef};
use serde::{Deserialize, Serialize};

/// Format of a record's `content` and `excerpt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    /// Markdown converted from the body
    LlmFriendly,
    /// Body markup as rendered
    Html,
}

/// One exported post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: u64,
    /// Title with entities decoded
    pub title: String,
    /// Publish date, `YYYY-MM-DD`
    pub date: String,
    pub slug: String,
    pub content: String,
    pub author: String,
    /// Absolute URL
    pub url: String,
    /// Words in the body before any conversion
    pub word_count: usize,
    pub format: ContentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<TermRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TermRef>,
}

/// Options echoed into the document metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptionsSummary {
    pub llm_friendly: bool,
    pub custom_excerpts_only: bool,
    pub export_type: ExportType,
    /// Present only for category exports, `null` otherwise
    pub category_id: Option<u64>,
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Local time of the export, `YYYY-MM-DD HH:MM:SS`
    pub export_date: String,
    pub site_title: String,
    pub site_url: String,
    pub post_count: usize,
    pub export_options: ExportOptionsSummary,
    pub platform_version: String,
    pub plugin_version: String,
}

/// The full export payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    /// Records in retrieval order
    pub posts: Vec<ExportRecord>,
}

/// A finished export: the document plus the filename to deliver it under
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub document: ExportDocument,
    pub filename: String,
}
