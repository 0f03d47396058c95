//! Document store abstraction for catalog reads.
//!
//! The query layer only talks to [`CatalogStore`]. The SurrealDB backend is used in
//! deployments; the in-memory backend serves development runs and tests with the same
//! filter semantics.

use crate::catalog::{Career, CollegeExam, EntryKind, Question, RiasecType, Roadmap};
use crate::error::Result;
use crate::seed::SeedData;
use async_trait::async_trait;

pub mod memory;
pub mod surreal;

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

/// Case-insensitive substring needle, stored lowercased
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText(String);

impl SearchText {
    /// Returns None for an empty search string
    pub fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_lowercase()))
        }
    }

    pub fn needle(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.0)
    }
}

/// Filter for the careers listing: search over title OR description, AND type equality
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CareerFilter {
    pub search: Option<SearchText>,
    pub kind: Option<RiasecType>,
}

impl CareerFilter {
    pub fn matches(&self, career: &Career) -> bool {
        let search_ok = self
            .search
            .as_ref()
            .is_none_or(|s| s.matches(&career.title) || s.matches(&career.description));
        let kind_ok = self.kind.is_none_or(|k| k == career.kind);
        search_ok && kind_ok
    }
}

/// Filter for the college/exam listing: search over name OR stream, AND kind equality
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub search: Option<SearchText>,
    pub kind: Option<EntryKind>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &CollegeExam) -> bool {
        let search_ok = self
            .search
            .as_ref()
            .is_none_or(|s| s.matches(&entry.name) || s.matches(&entry.stream));
        let kind_ok = self.kind.is_none_or(|k| k == entry.kind());
        search_ok && kind_ok
    }
}

/// Skip/limit window of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn count_careers(&self, filter: &CareerFilter) -> Result<u64>;

    /// Careers in listing form (no sub-careers), in stored order
    async fn find_careers(&self, filter: &CareerFilter, window: PageWindow)
    -> Result<Vec<Career>>;

    /// Lookup by the domain id, not the storage record id
    async fn career_by_id(&self, id: i64) -> Result<Option<Career>>;

    async fn questions(&self) -> Result<Vec<Question>>;

    async fn roadmaps(&self) -> Result<Vec<Roadmap>>;

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64>;

    async fn find_entries(
        &self,
        filter: &EntryFilter,
        window: PageWindow,
    ) -> Result<Vec<CollegeExam>>;

    /// Drop every collection and load the seed data in its place
    async fn replace_all(&self, seed: SeedData) -> Result<()>;
}
