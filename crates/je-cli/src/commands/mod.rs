//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod categories;
pub mod config;
pub mod export;
pub mod init;

use anyhow::Context;
use clap::{Parser, Subcommand};
use je_core::config::Config;
use je_core::ExportError;
use je_storage::FileSystemStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit code for runs the caller's selection made impossible
pub const EXIT_CLIENT_ERROR: i32 = 3;

/// Exit code for every other failure
pub const EXIT_FAILURE: i32 = 1;

/// json-export - Export CMS posts as JSON
#[derive(Debug, Parser)]
#[command(name = "json-export")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export published posts as a JSON document
    Export(export::ExportArgs),

    /// List categories with their post counts
    Categories(categories::CategoriesArgs),

    /// Initialize json-export in a site directory
    Init(init::InitArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Handle color output
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    // Dispatch to command handler
    match cli.command {
        Commands::Export(args) => export::execute(args, &config_path),
        Commands::Categories(args) => categories::execute(args, &config_path),
        Commands::Init(args) => init::execute(args),
        Commands::Config(cmd) => config::execute(cmd, &config_path),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout carries export payloads
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Process exit code for a failed run
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ExportError>() {
        Some(export_err) if export_err.is_client_error() => EXIT_CLIENT_ERROR,
        _ => EXIT_FAILURE,
    }
}

/// Load configuration with a readable error
pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Content store for a command.
///
/// `--content-dir` wins, then the directory named by the project
/// configuration. Without a configuration file the user data directory is used.
pub(crate) fn open_store(
    content_dir: Option<PathBuf>,
    config: &Config,
    config_path: &Path,
) -> anyhow::Result<FileSystemStore> {
    let dir = match content_dir {
        Some(dir) => dir,
        None if config_path.exists() => config.content.resolve_dir(config_path),
        None => {
            let store = FileSystemStore::default_location()
                .context("Failed to open the user content store")?;
            debug!("No project configuration, using {:?}", store.base_dir());
            return Ok(store);
        }
    };

    FileSystemStore::open(&dir).with_context(|| {
        format!(
            "No content store at {}. Run 'json-export init' first",
            dir.display()
        )
    })
}
