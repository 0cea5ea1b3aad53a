//! je-core - Core library for json-export
//!
//! This crate provides the export pipeline for json-export: markup
//! conversion, per-post record building and export document assembly.

pub mod error;
pub mod types;
pub mod config;
pub mod convert;
pub mod store;
pub mod export;

pub use error::{ExportError, Result};
pub use types::*;
