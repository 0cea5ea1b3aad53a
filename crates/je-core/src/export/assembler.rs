//! Export assembly

use super::document::{ExportDocument, ExportMetadata, ExportOptionsSummary, ExportOutput};
use super::filter::ExportFilter;
use super::options::ExportOptions;
use super::record::RecordBuilder;
use super::render::ContentRenderer;
use crate::config::SiteConfig;
use crate::convert::sanitize_title;
use crate::error::{ExportError, Result};
use crate::store::ContentStore;
use crate::types::{SelectionCriteria, Taxonomy, TermInfo};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

/// Version written into `metadata.plugin_version`
pub const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs exports against a content store
pub struct PostExporter<S: ContentStore> {
    store: S,
    site: SiteConfig,
    builder: RecordBuilder,
    filters: Vec<Box<dyn ExportFilter>>,
}

impl<S: ContentStore> PostExporter<S> {
    /// Create an exporter for a site
    pub fn new(store: S, site: SiteConfig) -> Self {
        let builder = RecordBuilder::new(site.url.clone());
        Self {
            store,
            site,
            builder,
            filters: Vec::new(),
        }
    }

    /// Set the body rendering pipeline
    pub fn with_renderer(mut self, renderer: impl ContentRenderer + 'static) -> Self {
        self.builder = self.builder.with_renderer(Box::new(renderer));
        self
    }

    /// Register a document filter
    pub fn with_filter(mut self, filter: impl ExportFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Export using the local clock
    pub fn export(
        &self,
        selection: &SelectionCriteria,
        options: &ExportOptions,
    ) -> Result<ExportOutput> {
        self.export_at(selection, options, Local::now().naive_local())
    }

    /// Export with an explicit clock reading for `export_date` and the filename
    pub fn export_at(
        &self,
        selection: &SelectionCriteria,
        options: &ExportOptions,
        now: NaiveDateTime,
    ) -> Result<ExportOutput> {
        debug!("Exporting {} with {:?}", selection, options);

        let term = match selection {
            SelectionCriteria::All { .. } => None,
            SelectionCriteria::Category { term_id } => Some(
                self.store
                    .resolve_term(*term_id, Taxonomy::Category)?
                    .ok_or(ExportError::InvalidSelection(*term_id))?,
            ),
        };

        let items = self.store.query(selection)?;
        if items.is_empty() {
            return Err(ExportError::NoMatchingContent);
        }

        let posts: Vec<_> = items
            .iter()
            .map(|item| self.builder.build(item, options))
            .collect();

        let filename = export_filename(&self.site.title, term.as_ref(), now);

        let metadata = ExportMetadata {
            export_date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            site_title: self.site.title.clone(),
            site_url: self.site.url.clone(),
            post_count: posts.len(),
            export_options: ExportOptionsSummary {
                llm_friendly: options.llm_friendly,
                custom_excerpts_only: options.custom_excerpts_only,
                export_type: selection.export_type(),
                category_id: selection.category_id(),
            },
            platform_version: self.site.platform_version.clone(),
            plugin_version: EXPORTER_VERSION.to_string(),
        };

        let document = self
            .filters
            .iter()
            .fold(ExportDocument { metadata, posts }, |document, filter| {
                filter.apply(document, selection)
            });

        info!("Exported {} posts as {}", document.posts.len(), filename);
        Ok(ExportOutput { document, filename })
    }
}

/// `{site}-export-{all|category-<term>}-{YYYY-MM-DD-HHMMSS}.json`
pub fn export_filename(site_title: &str, term: Option<&TermInfo>, now: NaiveDateTime) -> String {
    let site = match sanitize_title(site_title) {
        slug if slug.is_empty() => "site".to_string(),
        slug => slug,
    };
    let selection = match term {
        Some(term) => format!("category-{}", sanitize_title(&term.name)),
        None => "all".to_string(),
    };
    format!("{}-export-{}-{}.json", site, selection, now.format("%Y-%m-%d-%H%M%S"))
}
