//! Content store abstraction

use crate::error::Result;
use crate::types::{ContentItem, SelectionCriteria, Taxonomy, TermInfo, TermSummary};

/// Read-only access to the system of record for posts
pub trait ContentStore: Send + Sync {
    /// Published posts matching the selection, in store order
    fn query(&self, selection: &SelectionCriteria) -> Result<Vec<ContentItem>>;

    /// Look up a term; `None` when it does not exist
    fn resolve_term(&self, id: u64, taxonomy: Taxonomy) -> Result<Option<TermInfo>>;

    /// Categories with their published post counts, ordered by name
    fn categories(&self) -> Result<Vec<TermSummary>>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn query(&self, selection: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        (**self).query(selection)
    }

    fn resolve_term(&self, id: u64, taxonomy: Taxonomy) -> Result<Option<TermInfo>> {
        (**self).resolve_term(id, taxonomy)
    }

    fn categories(&self) -> Result<Vec<TermSummary>> {
        (**self).categories()
    }
}

impl<S: ContentStore + ?Sized> ContentStore for Box<S> {
    fn query(&self, selection: &SelectionCriteria) -> Result<Vec<ContentItem>> {
        (**self).query(selection)
    }

    fn resolve_term(&self, id: u64, taxonomy: Taxonomy) -> Result<Option<TermInfo>> {
        (**self).resolve_term(id, taxonomy)
    }

    fn categories(&self) -> Result<Vec<TermSummary>> {
        (**self).categories()
    }
}

/// In-memory store for embedding and tests
pub mod memory {
    use super::*;

    /// Posts and terms held in memory, returned in insertion order
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        terms: Vec<TermInfo>,
        posts: Vec<(String, ContentItem)>,
    }

    impl MemoryStore {
        /// Create an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a term
        pub fn add_term(&mut self, term: TermInfo) {
            self.terms.retain(|t| !(t.id == term.id && t.taxonomy == term.taxonomy));
            self.terms.push(term);
        }

        /// Add a published post of the given post type
        pub fn add_post(&mut self, post_type: impl Into<String>, item: ContentItem) {
            self.posts.push((post_type.into(), item));
        }

        /// Number of stored posts
        pub fn len(&self) -> usize {
            self.posts.len()
        }

        pub fn is_empty(&self) -> bool {
            self.posts.is_empty()
        }
    }

    impl ContentStore for MemoryStore {
        fn query(&self, selection: &SelectionCriteria) -> Result<Vec<ContentItem>> {
            let items = self
                .posts
                .iter()
                .filter(|(post_type, item)| match selection {
                    SelectionCriteria::All { post_type: wanted } => post_type == wanted,
                    SelectionCriteria::Category { term_id } => {
                        item.categories.iter().any(|c| c.id == *term_id)
                    }
                })
                .map(|(_, item)| item.clone())
                .collect();
            Ok(items)
        }

        fn resolve_term(&self, id: u64, taxonomy: Taxonomy) -> Result<Option<TermInfo>> {
            Ok(self
                .terms
                .iter()
                .find(|t| t.id == id && t.taxonomy == taxonomy)
                .cloned())
        }

        fn categories(&self) -> Result<Vec<TermSummary>> {
            let mut summaries: Vec<TermSummary> = self
                .terms
                .iter()
                .filter(|t| t.taxonomy == Taxonomy::Category)
                .map(|term| TermSummary {
                    term: term.clone(),
                    count: self
                        .posts
                        .iter()
                        .filter(|(_, item)| item.categories.iter().any(|c| c.id == term.id))
                        .count(),
                })
                .collect();
            summaries.sort_by(|a, b| a.term.name.to_lowercase().cmp(&b.term.name.to_lowercase()));
            Ok(summaries)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::types::TermRef;
        use chrono::NaiveDate;

        fn term(id: u64, name: &str) -> TermInfo {
            TermInfo {
                id,
                taxonomy: Taxonomy::Category,
                name: name.to_string(),
                slug: name.to_lowercase(),
            }
        }

        fn post(id: u64, category: Option<&TermInfo>) -> ContentItem {
            let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let item = ContentItem::new(id, format!("Post {}", id), "<p>x</p>", date);
            match category {
                Some(term) => {
                    item.with_category(TermRef::new(term.id, term.name.clone(), term.slug.clone()))
                }
                None => item,
            }
        }

        #[test]
        fn test_query_by_type_and_category() {
            let news = term(5, "News");
            let mut store = MemoryStore::new();
            store.add_term(news.clone());
            store.add_post("post", post(1, Some(&news)));
            store.add_post("post", post(2, None));
            store.add_post("page", post(3, None));

            let all = store.query(&SelectionCriteria::all()).unwrap();
            assert_eq!(all.iter().map(|i| i.id.0).collect::<Vec<_>>(), vec![1, 2]);

            let in_news = store.query(&SelectionCriteria::category(5)).unwrap();
            assert_eq!(in_news.len(), 1);
            assert_eq!(in_news[0].id.0, 1);
        }

        #[test]
        fn test_resolve_term_checks_taxonomy() {
            let mut store = MemoryStore::new();
            store.add_term(term(5, "News"));

            assert!(store.resolve_term(5, Taxonomy::Category).unwrap().is_some());
            assert!(store.resolve_term(5, Taxonomy::Tag).unwrap().is_none());
            assert!(store.resolve_term(6, Taxonomy::Category).unwrap().is_none());
        }

        #[test]
        fn test_categories_sorted_with_counts() {
            let news = term(5, "News");
            let art = term(6, "art");
            let mut store = MemoryStore::new();
            store.add_term(news.clone());
            store.add_term(art);
            store.add_post("post", post(1, Some(&news)));
            store.add_post("post", post(2, Some(&news)));

            let categories = store.categories().unwrap();
            assert_eq!(categories[0].term.name, "art");
            assert_eq!(categories[0].count, 0);
            assert_eq!(categories[1].count, 2);
        }
    }
}

pub use memory::MemoryStore;
