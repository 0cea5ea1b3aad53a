//! Init command
//!
//! Initialize json-export configuration and content store in a directory.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use je_core::config::{Config, CONFIG_FILE, CONTENT_DIR, PROJECT_DIR};
use je_storage::FileSystemStore;

/// Arguments for the init command
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,

    /// Directory to initialize (default: current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Execute the init command
pub fn execute(args: InitArgs) -> Result<()> {
    use colored::Colorize;

    let site_dir = args
        .path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    println!("Initializing json-export in {}...", site_dir.display());

    // Check if already initialized
    let project_dir = site_dir.join(PROJECT_DIR);
    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        eprintln!(
            "{} json-export already initialized. Use --force to reinitialize.",
            "⚠".yellow()
        );
        return Ok(());
    }

    // Create content store skeleton
    let store = create_content_store(&project_dir)?;
    println!(
        "{} Created content store at {}",
        "✓".green(),
        store.base_dir().display()
    );

    // Generate configuration
    let config = Config::default();
    config
        .save(&config_path)
        .context(format!("Failed to write {}", config_path.display()))?;
    println!("{} Generated {}", "✓".green(), config_path.display());

    // Print summary
    println!("\n{}", "Next steps:".bold());
    println!("  1. Set your site title and URL in {}/{}", PROJECT_DIR, CONFIG_FILE);
    println!("  2. Add terms to content/terms.json and posts to content/posts/");
    println!("  3. Run your first export:");
    println!("     ");
    println!("     {}", "json-export export --all --llm-friendly".cyan());

    Ok(())
}

fn create_content_store(project_dir: &Path) -> Result<FileSystemStore> {
    let content_dir = project_dir.join(CONTENT_DIR);
    FileSystemStore::create(&content_dir).with_context(|| {
        format!(
            "Failed to create content store at {}",
            content_dir.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_layout() {
        let temp = tempfile::tempdir().unwrap();
        execute(InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        let project_dir = temp.path().join(PROJECT_DIR);
        assert!(project_dir.join(CONFIG_FILE).exists());
        assert!(project_dir.join(CONTENT_DIR).join("terms.json").exists());
        assert!(project_dir.join(CONTENT_DIR).join("posts").is_dir());

        let config = Config::load(&project_dir.join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join(PROJECT_DIR).join(CONFIG_FILE);
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "[site]\ntitle = \"Kept\"\n").unwrap();

        execute(InitArgs {
            force: false,
            path: Some(temp.path().to_path_buf()),
        })
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.site.title, "Kept");
    }
}
