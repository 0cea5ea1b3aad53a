//! File system content store

use chrono::NaiveDateTime;
use je_core::error::{ExportError, Result};
use je_core::store::ContentStore;
use je_core::types::{
    ContentItem, PostId, SelectionCriteria, Taxonomy, TermInfo, TermRef, TermSummary,
    DEFAULT_POST_TYPE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory holding one JSON file per post
pub const POSTS_DIR: &str = "posts";

/// File listing every taxonomy term
pub const TERMS_FILE: &str = "terms.json";

const PUBLISH_STATUS: &str = "publish";

fn default_post_type() -> String {
    DEFAULT_POST_TYPE.to_string()
}

fn default_status() -> String {
    PUBLISH_STATUS.to_string()
}

/// A post as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: u64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Author-supplied excerpt, empty when none was written
    #[serde(default)]
    pub excerpt: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    /// Category term ids
    #[serde(default)]
    pub categories: Vec<u64>,
    /// Tag term ids
    #[serde(default)]
    pub tags: Vec<u64>,
}

impl StoredPost {
    fn is_published(&self) -> bool {
        self.status == PUBLISH_STATUS
    }
}

/// A taxonomy term as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTerm {
    pub id: u64,
    pub taxonomy: Taxonomy,
    pub name: String,
    pub slug: String,
}

impl From<StoredTerm> for TermInfo {
    fn from(term: StoredTerm) -> Self {
        TermInfo {
            id: term.id,
            taxonomy: term.taxonomy,
            name: term.name,
            slug: term.slug,
        }
    }
}

/// Content store reading posts and terms from a directory.
///
/// Layout: `<dir>/terms.json` and `<dir>/posts/<id>.json`.
pub struct FileSystemStore {
    /// Base directory of the store
    base_dir: PathBuf,
    /// Posts subdirectory
    posts_dir: PathBuf,
}

impl FileSystemStore {
    /// Open an existing store
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::at(base_dir.into());
        if !store.posts_dir.is_dir() {
            return Err(ExportError::FileNotFound(store.posts_dir.clone()));
        }
        Ok(store)
    }

    /// Create the directory layout if needed and open the store
    pub fn create(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::at(base_dir.into());
        store.ensure_dirs()?;
        Ok(store)
    }

    /// Store in the user data directory (~/.json-export)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "json-export", "json-export")
            .map(|dirs| dirs.data_dir().join("content"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".json-export")
                    .join("content")
            });

        Self::create(base_dir)
    }

    fn at(base_dir: PathBuf) -> Self {
        let posts_dir = base_dir.join(POSTS_DIR);
        Self {
            base_dir,
            posts_dir,
        }
    }

    /// Ensure required directories and the terms file exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.posts_dir.exists() {
            fs::create_dir_all(&self.posts_dir).map_err(|e| {
                ExportError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create posts directory: {}", e),
                ))
            })?;
            debug!("Created posts directory: {:?}", self.posts_dir);
        }
        if !self.terms_path().exists() {
            self.save_terms(&[])?;
        }
        Ok(())
    }

    fn terms_path(&self) -> PathBuf {
        self.base_dir.join(TERMS_FILE)
    }

    fn post_path(&self, id: u64) -> PathBuf {
        self.posts_dir.join(format!("{}.json", id))
    }

    /// Write a JSON file atomically (write to temp, then rename)
    fn atomic_write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let temp_path = path.with_extension("json.tmp");

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            ExportError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ExportError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;
        Ok(())
    }

    /// Save a post, replacing any post with the same id
    pub fn save_post(&self, post: &StoredPost) -> Result<()> {
        self.atomic_write(&self.post_path(post.id), post)?;
        debug!("Saved post {} to {:?}", post.id, self.post_path(post.id));
        Ok(())
    }

    /// Replace the term list
    pub fn save_terms(&self, terms: &[StoredTerm]) -> Result<()> {
        self.atomic_write(&self.terms_path(), &terms)
    }

    /// Load every term; a missing terms file means no terms
    pub fn load_terms(&self) -> Result<Vec<StoredTerm>> {
        let path = self.terms_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)?;
        let terms: Vec<StoredTerm> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ExportError::Store(format!("Invalid {}: {}", path.display(), e)))?;
        Ok(terms)
    }

    /// Load every readable post file, skipping broken ones
    pub fn load_posts(&self) -> Result<Vec<StoredPost>> {
        let entries = fs::read_dir(&self.posts_dir).map_err(|e| {
            ExportError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read posts directory: {}", e),
            ))
        })?;

        let mut posts = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match read_post(&path) {
                Ok(post) => posts.push(post),
                Err(e) => warn!("Failed to read post file {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Published posts of `post_type`, newest first
    fn published(&self, post_type: &str) -> Result<Vec<StoredPost>> {
        let mut posts: Vec<StoredPost> = self
            .load_posts()?
            .into_iter()
            .filter(|p| p.is_published() && p.post_type == post_type)
            .collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }
}

fn read_post(path: &Path) -> Result<StoredPost> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Term lookup by (taxonomy, id)
struct TermIndex(HashMap<(Taxonomy, u64), StoredTerm>);

impl TermIndex {
    fn new(terms: Vec<StoredTerm>) -> Self {
        Self(terms.into_iter().map(|t| ((t.taxonomy, t.id), t)).collect())
    }

    fn refs(&self, post: &StoredPost, taxonomy: Taxonomy, ids: &[u64]) -> Vec<TermRef> {
        ids.iter()
            .filter_map(|id| match self.0.get(&(taxonomy, *id)) {
                Some(term) => Some(TermRef::new(term.id, term.name.clone(), term.slug.clone())),
                None => {
                    warn!("Post {} references unknown {} {}", post.id, taxonomy, id);
                    None
                }
            })
            .collect()
    }

    fn item(&self, post: StoredPost) -> ContentItem {
        let categories = self.refs(&post, Taxonomy::Category, &post.categories);
        let tags = self.refs(&post, Taxonomy::Tag, &post.tags);
        ContentItem {
            id: PostId(post.id),
            title: post.title,
            content: post.content,
            date: post.date,
            author: post.author,
            permalink: post.permalink,
            slug: post.slug,
            excerpt: Some(post.excerpt).filter(|e| !e.is_empty()),
            categories,
            tags,
        }
    }
}

impl ContentStore for FileSystemStore {
    fn query(&self, selection: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        let posts = match selection {
            SelectionCriteria::All { post_type } => self.published(post_type)?,
            SelectionCriteria::Category { term_id } => self
                .published(DEFAULT_POST_TYPE)?
                .into_iter()
                .filter(|p| p.categories.contains(term_id))
                .collect(),
        };

        let index = TermIndex::new(self.load_terms()?);
        let items: Vec<ContentItem> = posts.into_iter().map(|p| index.item(p)).collect();
        debug!("Query {} matched {} posts", selection, items.len());
        Ok(items)
    }

    fn resolve_term(&self, id: u64, taxonomy: Taxonomy) -> Result<Option<TermInfo>> {
        Ok(self
            .load_terms()?
            .into_iter()
            .find(|t| t.id == id && t.taxonomy == taxonomy)
            .map(TermInfo::from))
    }

    fn categories(&self) -> Result<Vec<TermSummary>> {
        let posts = self.published(DEFAULT_POST_TYPE)?;

        let mut summaries: Vec<TermSummary> = self
            .load_terms()?
            .into_iter()
            .filter(|t| t.taxonomy == Taxonomy::Category)
            .map(|term| {
                let count = posts.iter().filter(|p| p.categories.contains(&term.id)).count();
                TermSummary {
                    term: term.into(),
                    count,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            a.term
                .name
                .to_lowercase()
                .cmp(&b.term.name.to_lowercase())
                .then(a.term.id.cmp(&b.term.id))
        });
        Ok(summaries)
    }
}
