//! je-storage - Content store backends for json-export
//!
//! This crate provides a file-system content store for the export pipeline.

mod content_store;

pub use content_store::{FileSystemStore, StoredPost, StoredTerm, POSTS_DIR, TERMS_FILE};
