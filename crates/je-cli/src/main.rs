//! json-export - CMS post exporter CLI
//!
//! Exports published posts as a single JSON document, optionally with
//! bodies converted from HTML to Markdown for LLM ingestion.
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize in your site directory
//! json-export init
//!
//! # See which categories can be exported
//! json-export categories
//!
//! # Export every post with Markdown bodies
//! json-export export --all --llm-friendly
//!
//! # Export one category to stdout
//! json-export export --category 5 --stdout
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(commands::exit_code(&err));
    }
}
