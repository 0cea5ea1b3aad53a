//! Configuration management for json-export

use crate::error::{ExportError, Result};
use crate::export::ExportOptions;
use crate::types::DEFAULT_POST_TYPE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project directory holding configuration and content
pub const PROJECT_DIR: &str = ".json-export";

/// Configuration file name inside [`PROJECT_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Default content store directory, next to the configuration file
pub const CONTENT_DIR: &str = "content";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity written into export metadata
    pub site: SiteConfig,
    /// Content store settings
    pub content: ContentConfig,
    /// Export defaults
    pub export: ExportConfig,
}

impl Config {
    /// Default configuration path relative to the working directory
    pub fn default_path() -> PathBuf {
        Path::new(PROJECT_DIR).join(CONFIG_FILE)
    }

    /// Load configuration from a TOML file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ExportError::from(e).with_context(format!("Invalid config {}", path.display()))
        })?;
        config.validate()?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.site.title.trim().is_empty() {
            return Err(ExportError::Config("site.title must not be empty".into()));
        }
        if !(self.site.url.starts_with("http://") || self.site.url.starts_with("https://")) {
            return Err(ExportError::Config(format!(
                "site.url must be an absolute http(s) URL, got '{}'",
                self.site.url
            )));
        }
        if self.content.post_type.trim().is_empty() {
            return Err(ExportError::Config("content.post_type must not be empty".into()));
        }
        Ok(())
    }
}

/// Site identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, also the base of generated filenames
    pub title: String,
    /// Absolute site URL
    pub url: String,
    /// Version of the host CMS
    pub platform_version: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            url: "http://localhost".to_string(),
            platform_version: "6.7".to_string(),
        }
    }
}

/// Content store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory of the file-system content store; relative paths start at
    /// the directory holding the configuration file
    pub dir: PathBuf,
    /// Post type exported in "all" mode
    pub post_type: String,
    /// Wrap bare text blocks in paragraphs before export
    pub auto_paragraph: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(CONTENT_DIR),
            post_type: DEFAULT_POST_TYPE.to_string(),
            auto_paragraph: true,
        }
    }
}

impl ContentConfig {
    /// Content directory for a configuration loaded from `config_path`
    pub fn resolve_dir(&self, config_path: &Path) -> PathBuf {
        if self.dir.is_absolute() {
            return self.dir.clone();
        }
        match config_path.parent() {
            Some(base) => base.join(&self.dir),
            None => self.dir.clone(),
        }
    }
}

/// Export defaults, overridable per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Convert bodies and excerpts to Markdown
    pub llm_friendly: bool,
    /// Only include excerpts the author wrote
    pub custom_excerpts_only: bool,
    pub include_headings: bool,
    pub include_images: bool,
    pub include_links: bool,
    /// Where export files are written
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            llm_friendly: false,
            custom_excerpts_only: false,
            include_headings: false,
            include_images: false,
            include_links: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    /// Option set described by this configuration
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            llm_friendly: self.llm_friendly,
            custom_excerpts_only: self.custom_excerpts_only,
            include_headings: self.include_headings,
            include_images: self.include_images,
            include_links: self.include_links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.export.llm_friendly);
        assert!(!config.export.custom_excerpts_only);
        assert_eq!(config.content.post_type, "post");
        assert!(config.content.auto_paragraph);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[site]"));
        assert!(toml.contains("[content]"));
        assert!(toml.contains("[export]"));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.site, config2.site);
        assert_eq!(config.content.dir, config2.content.dir);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [site]
            title = "Calm Notes"

            [export]
            llm_friendly = true
            "#,
        )
        .unwrap();

        assert_eq!(config.site.title, "Calm Notes");
        assert_eq!(config.site.url, "http://localhost");
        assert!(config.export.options().llm_friendly);
        assert!(!config.export.options().custom_excerpts_only);
    }

    #[test]
    fn test_content_dir_is_relative_to_config_file() {
        let content = ContentConfig::default();
        let config_path = Path::new("sites").join("blog").join(PROJECT_DIR).join(CONFIG_FILE);
        assert_eq!(
            content.resolve_dir(&config_path),
            Path::new("sites").join("blog").join(PROJECT_DIR).join(CONTENT_DIR)
        );
        assert_eq!(
            content.resolve_dir(&Config::default_path()),
            Path::new(PROJECT_DIR).join(CONTENT_DIR)
        );

        let temp = TempDir::new().unwrap();
        let absolute = ContentConfig {
            dir: temp.path().to_path_buf(),
            ..ContentConfig::default()
        };
        assert_eq!(absolute.resolve_dir(&config_path), temp.path());
    }

    #[test]
    fn test_load_missing_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("missing.toml")).unwrap();
        assert_eq!(config.site.title, "My Site");
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.site.title = "Field Notes".into();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.site.title, "Field Notes");
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let mut config = Config::default();
        config.site.url = "example.com".into();
        assert!(matches!(config.validate(), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[site\ntitle = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
