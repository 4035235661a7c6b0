//! Remote store contracts for bindings.
//!
//! [`BindingStore`] is the persistence collaborator (fetch, list siblings,
//! create, update) and [`CandidateCatalog`] the entity catalog that lists
//! selectable policies, groups and users page by page. Both are treated as
//! opaque remote services by the resolver.
//!
//! [`MemoryStore`] implements both in process and is the reference backend
//! for the [`conformance`] suite.

pub mod conformance;
mod error;
mod memory;
mod query;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{CandidateOrdering, CandidatePage, CandidateQuery, DEFAULT_PAGE_SIZE};
pub use traits::{BindingStore, CandidateCatalog};
