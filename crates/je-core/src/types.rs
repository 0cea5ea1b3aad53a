//! Core type definitions for json-export

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default post type exported in "all" mode
pub const DEFAULT_POST_TYPE: &str = "post";

/// Identifier of a post in the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Taxonomy a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    Category,
    #[serde(rename = "post_tag")]
    Tag,
}

impl Taxonomy {
    /// Storage name of the taxonomy
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Category => "category",
            Taxonomy::Tag => "post_tag",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category or tag attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl TermRef {
    pub fn new(id: u64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}

/// A resolved taxonomy term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermInfo {
    pub id: u64,
    pub taxonomy: Taxonomy,
    pub name: String,
    pub slug: String,
}

impl TermInfo {
    /// Reference form used inside export records
    pub fn to_ref(&self) -> TermRef {
        TermRef::new(self.id, self.name.clone(), self.slug.clone())
    }
}

/// A term together with the number of published posts using it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSummary {
    #[serde(flatten)]
    pub term: TermInfo,
    pub count: usize,
}

/// A published post as handed over by the content store.
///
/// Read-only input to the export pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: PostId,
    /// Title as stored, may contain HTML entities
    pub title: String,
    /// Raw body markup
    pub content: String,
    /// Publish date
    pub date: NaiveDateTime,
    /// Author display name
    pub author: String,
    /// Permalink, absolute or relative to the site URL
    pub permalink: String,
    pub slug: String,
    /// Author-supplied excerpt
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub categories: Vec<TermRef>,
    #[serde(default)]
    pub tags: Vec<TermRef>,
}

impl ContentItem {
    /// Create an item with the required fields; the rest start empty
    pub fn new(
        id: u64,
        title: impl Into<String>,
        content: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id: PostId(id),
            title: title.into(),
            content: content.into(),
            date,
            author: String::new(),
            permalink: String::new(),
            slug: String::new(),
            excerpt: None,
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = permalink.into();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_category(mut self, term: TermRef) -> Self {
        self.categories.push(term);
        self
    }

    pub fn with_tag(mut self, term: TermRef) -> Self {
        self.tags.push(term);
        self
    }

    /// The author-supplied excerpt, if one was written
    pub fn custom_excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether the post carries an author-supplied excerpt
    pub fn has_custom_excerpt(&self) -> bool {
        self.custom_excerpt().is_some()
    }
}

/// Kind of export recorded in the document metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    All,
    Category,
}

/// Which posts an export covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SelectionCriteria {
    /// Every published post of a post type
    All { post_type: String },
    /// Published posts in one category
    Category { term_id: u64 },
}

impl SelectionCriteria {
    /// All published posts of the default post type
    pub fn all() -> Self {
        SelectionCriteria::All {
            post_type: DEFAULT_POST_TYPE.to_string(),
        }
    }

    pub fn all_of_type(post_type: impl Into<String>) -> Self {
        SelectionCriteria::All {
            post_type: post_type.into(),
        }
    }

    pub fn category(term_id: u64) -> Self {
        SelectionCriteria::Category { term_id }
    }

    pub fn export_type(&self) -> ExportType {
        match self {
            SelectionCriteria::All { .. } => ExportType::All,
            SelectionCriteria::Category { .. } => ExportType::Category,
        }
    }

    /// The selected category, `Some` only in category mode
    pub fn category_id(&self) -> Option<u64> {
        match self {
            SelectionCriteria::All { .. } => None,
            SelectionCriteria::Category { term_id } => Some(*term_id),
        }
    }
}

impl fmt::Display for SelectionCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionCriteria::All { post_type } => write!(f, "all {}", post_type),
            SelectionCriteria::Category { term_id } => write!(f, "category {}", term_id),
        }
    }
}
