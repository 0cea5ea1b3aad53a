//! Export command
//!
//! Export published posts to a JSON document.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use je_core::config::Config;
use je_core::export::{
    AutoParagraph, ExportOptions, FileSink, OutputSink, PostExporter, StdoutSink,
};
use je_core::types::SelectionCriteria;

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export every published post (default)
    #[arg(long, conflicts_with = "category")]
    pub all: bool,

    /// Export only posts in this category
    #[arg(long, value_name = "ID")]
    pub category: Option<u64>,

    /// Post type to export in "all" mode
    #[arg(long, value_name = "TYPE")]
    pub post_type: Option<String>,

    /// Convert bodies to Markdown
    #[arg(long, overrides_with = "no_llm_friendly")]
    pub llm_friendly: bool,

    /// Keep bodies as HTML
    #[arg(long, overrides_with = "llm_friendly")]
    pub no_llm_friendly: bool,

    /// Only include author-written excerpts
    #[arg(long, overrides_with = "all_excerpts")]
    pub custom_excerpts_only: bool,

    /// Generate excerpts for posts without one
    #[arg(long, overrides_with = "custom_excerpts_only")]
    pub all_excerpts: bool,

    /// Record that headings were requested
    #[arg(long)]
    pub include_headings: bool,

    /// Record that images were requested
    #[arg(long)]
    pub include_images: bool,

    /// Record that links were requested
    #[arg(long)]
    pub include_links: bool,

    /// Content store directory
    #[arg(long, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,

    /// Directory to write the export into
    #[arg(long, short, value_name = "DIR", conflicts_with = "stdout")]
    pub output_dir: Option<PathBuf>,

    /// Write the export to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

impl ExportArgs {
    fn selection(&self, config: &Config) -> SelectionCriteria {
        match self.category {
            Some(term_id) => SelectionCriteria::category(term_id),
            None => SelectionCriteria::all_of_type(
                self.post_type
                    .clone()
                    .unwrap_or_else(|| config.content.post_type.clone()),
            ),
        }
    }

    /// Configured defaults with command line overrides applied
    fn options(&self, config: &Config) -> ExportOptions {
        let defaults = config.export.options();
        ExportOptions::new()
            .llm_friendly(toggle(self.llm_friendly, self.no_llm_friendly, defaults.llm_friendly))
            .custom_excerpts_only(toggle(
                self.custom_excerpts_only,
                self.all_excerpts,
                defaults.custom_excerpts_only,
            ))
            .include_headings(self.include_headings || defaults.include_headings)
            .include_images(self.include_images || defaults.include_images)
            .include_links(self.include_links || defaults.include_links)
    }
}

fn toggle(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

/// Execute the export command
pub fn execute(args: ExportArgs, config_path: &Path) -> Result<()> {
    use colored::Colorize;

    let config = super::load_config(config_path)?;

    // Set up storage
    let store = super::open_store(args.content_dir.clone(), &config, config_path)?;

    let selection = args.selection(&config);
    let options = args.options(&config);

    let mut exporter = PostExporter::new(store, config.site.clone());
    if config.content.auto_paragraph {
        exporter = exporter.with_renderer(AutoParagraph);
    }

    let output = exporter.export(&selection, &options)?;

    if args.stdout {
        StdoutSink
            .deliver(&output.document, &output.filename)
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.export.output_dir.clone());
    let sink = FileSink::new(output_dir);
    sink.deliver(&output.document, &output.filename)
        .with_context(|| format!("Failed to write export to {}", sink.dir().display()))?;

    eprintln!(
        "{} Exported {} posts to {}",
        "✓".green(),
        output.document.posts.len().to_string().yellow(),
        sink.path_for(&output.filename).display().to_string().cyan()
    );

    Ok(())
}
