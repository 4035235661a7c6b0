use binding_model::CandidateEntity;
use serde::{Deserialize, Serialize};

/// Page size used when a caller does not configure one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Sort key for candidate listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrdering {
    /// Deterministic order used for binding editors.
    #[default]
    PrimaryKey,
    Name,
}

/// One page request against the catalog. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub ordering: CandidateOrdering,
    pub page: u32,
    pub page_size: u32,
}

impl CandidateQuery {
    /// The first page, ordered by primary key.
    pub fn first(page_size: u32) -> Self {
        Self {
            ordering: CandidateOrdering::PrimaryKey,
            page: 1,
            page_size,
        }
    }

    pub fn with_ordering(mut self, ordering: CandidateOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// The same query pointed at `page`.
    pub fn at_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

impl Default for CandidateQuery {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandidatePage {
    pub results: Vec<CandidateEntity>,
    /// Number of the following page, `None` on the last page.
    pub next: Option<u32>,
    /// Total candidates across all pages.
    pub count: usize,
}
