//! Export options

use serde::{Deserialize, Serialize};

/// Formatting options for one export.
///
/// Every flag defaults to `false`; unset fields keep their default when
/// deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Convert bodies and excerpts to Markdown
    pub llm_friendly: bool,
    /// Only include excerpts the author wrote
    pub custom_excerpts_only: bool,
    /// Accepted for compatibility, conversion always keeps headings
    pub include_headings: bool,
    /// Accepted for compatibility, conversion always keeps images
    pub include_images: bool,
    /// Accepted for compatibility, conversion always keeps links
    pub include_links: bool,
}

impl ExportOptions {
    /// Create options with every flag off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn llm_friendly(mut self, enabled: bool) -> Self {
        self.llm_friendly = enabled;
        self
    }

    pub fn custom_excerpts_only(mut self, enabled: bool) -> Self {
        self.custom_excerpts_only = enabled;
        self
    }

    pub fn include_headings(mut self, enabled: bool) -> Self {
        self.include_headings = enabled;
        self
    }

    pub fn include_images(mut self, enabled: bool) -> Self {
        self.include_images = enabled;
        self
    }

    pub fn include_links(mut self, enabled: bool) -> Self {
        self.include_links = enabled;
        self
    }
}
