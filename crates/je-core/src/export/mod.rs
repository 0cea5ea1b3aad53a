//! Post export pipeline
//!
//! This module turns a selection of published posts into a JSON export
//! document, optionally converting bodies to Markdown for language models.
//!
//! # Overview
//!
//! An export runs in three stages:
//! - [`PostExporter`] resolves the selection against a content store
//! - [`RecordBuilder`] shapes every post into an [`ExportRecord`]
//! - an [`OutputSink`] serializes the finished [`ExportDocument`]
//!
//! # Example
//!
//! ```
//! use je_core::config::SiteConfig;
//! use je_core::export::{ExportOptions, PostExporter};
//! use je_core::store::MemoryStore;
//! use je_core::{ContentItem, SelectionCriteria};
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let mut store = MemoryStore::new();
//! store.add_post("post", ContentItem::new(1, "Hello", "<p>Hello <b>world</b></p>", date));
//!
//! let exporter = PostExporter::new(store, SiteConfig::default());
//! let options = ExportOptions::new().llm_friendly(true);
//! let output = exporter.export(&SelectionCriteria::all(), &options).unwrap();
//! assert_eq!(output.document.posts[0].content, "Hello **world**");
//! ```

mod assembler;
mod document;
mod filter;
mod options;
mod output;
mod record;
mod render;

pub use assembler::{export_filename, PostExporter, EXPORTER_VERSION};
pub use document::{
    ContentFormat, ExportDocument, ExportMetadata, ExportOptionsSummary, ExportOutput, ExportRecord,
};
pub use filter::ExportFilter;
pub use options::ExportOptions;
pub use output::{
    content_disposition, render_json, sanitize_file_name, FileSink, OutputSink, StdoutSink,
    CONTENT_TYPE,
};
pub use record::{resolve_url, RecordBuilder, EXCERPT_MORE, EXCERPT_WORD_LIMIT};
pub use render::{AutoParagraph, ContentRenderer, RawContent};
