//! Categories command
//!
//! List categories so a valid export selection can be picked.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use je_core::store::ContentStore;

/// Arguments for the categories command
#[derive(Debug, Args)]
pub struct CategoriesArgs {
    /// Show as JSON
    #[arg(long)]
    pub json: bool,

    /// Content store directory
    #[arg(long, value_name = "DIR")]
    pub content_dir: Option<PathBuf>,
}

/// Execute the categories command
pub fn execute(args: CategoriesArgs, config_path: &Path) -> Result<()> {
    use colored::Colorize;

    let config = super::load_config(config_path)?;
    let store = super::open_store(args.content_dir, &config, config_path)?;

    let categories = store.categories()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        eprintln!("{} No categories found.", "⚠".yellow());
        return Ok(());
    }

    println!("{}", "Categories:".bold().underline());
    for summary in &categories {
        println!(
            "  {:>6}  {} ({})",
            summary.term.id.to_string().cyan(),
            summary.term.name,
            summary.count.to_string().yellow()
        );
    }
    println!();
    println!(
        "Use '{}' to export one of them",
        "json-export export --category <ID>".cyan()
    );

    Ok(())
}
