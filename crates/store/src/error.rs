/// All errors that can be returned by a `BindingStore` or `CandidateCatalog`
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No binding with the given primary key.
    #[error("binding not found: {id}")]
    NotFound { id: String },

    /// The store refused the request, e.g. a payload referencing more than
    /// one target or an attempt to move a binding to another parent.
    #[error("rejected by store: {message}")]
    Rejected { message: String },

    /// The store could not be reached or did not answer in time.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A backend-specific error (serialization, lock poisoning, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        StoreError::Rejected {
            message: message.into(),
        }
    }
}
