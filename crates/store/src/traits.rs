use async_trait::async_trait;
use binding_model::{BindingPayload, TargetKind};

use crate::error::StoreError;
use crate::query::{CandidatePage, CandidateQuery};

/// Persistence for binding records.
///
/// Implementations own primary key assignment and are the single arbiter
/// of concurrent writes. Callers never hold a lock across these calls.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so editors can share
/// them behind an `Arc` across async task boundaries.
#[async_trait]
pub trait BindingStore: Send + Sync + 'static {
    /// Read one binding by primary key.
    ///
    /// Returns `Err(StoreError::NotFound)` if no such binding exists.
    async fn fetch_binding(&self, id: &str) -> Result<BindingPayload, StoreError>;

    /// List every binding attached to `parent`, whatever its target kind,
    /// ordered by `order` ascending.
    async fn list_bindings(&self, parent: &str) -> Result<Vec<BindingPayload>, StoreError>;

    /// Persist a new binding and return it with its assigned `pk`.
    ///
    /// Returns `Err(StoreError::Rejected)` when the payload does not
    /// reference exactly one target.
    async fn create_binding(&self, payload: BindingPayload) -> Result<BindingPayload, StoreError>;

    /// Replace the binding `id` with `payload`.
    ///
    /// The parent of an existing binding is immutable; changing it yields
    /// `Err(StoreError::Rejected)`. Unknown ids yield `Err(StoreError::NotFound)`.
    async fn update_binding(
        &self,
        id: &str,
        payload: BindingPayload,
    ) -> Result<BindingPayload, StoreError>;
}

/// Source of selectable binding targets.
#[async_trait]
pub trait CandidateCatalog: Send + Sync + 'static {
    /// Fetch one page of candidates of `kind`.
    async fn list_candidates(
        &self,
        kind: TargetKind,
        query: &CandidateQuery,
    ) -> Result<CandidatePage, StoreError>;
}
