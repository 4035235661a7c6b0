use std::fmt;

use binding_model::{TargetKind, ValidationErrors};
use binding_store::StoreError;

/// The part of an editor a remote fetch was loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The binding being edited.
    Binding,
    /// The parent's existing bindings, read for order assignment.
    Siblings,
    Candidates(TargetKind),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Binding => f.write_str("binding"),
            Section::Siblings => f.write_str("sibling bindings"),
            Section::Candidates(kind) => write!(f, "{} candidates", kind),
        }
    }
}

/// Errors surfaced by a binding edit session. None of them is fatal: the
/// draft is kept and the caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The draft breaks a submission rule. Reported per field.
    #[error("invalid binding: {0}")]
    Validation(#[from] ValidationErrors),

    /// Loading a binding, its siblings or a candidate list failed.
    #[error("could not load {section}: {source}")]
    RemoteFetch {
        section: Section,
        #[source]
        source: StoreError,
    },

    /// The store refused the create or update.
    #[error("could not save binding: {0}")]
    Submission(#[source] StoreError),
}

impl BindingError {
    pub(crate) fn fetch(section: Section) -> impl FnOnce(StoreError) -> Self {
        move |source| BindingError::RemoteFetch { section, source }
    }

    /// Per-field violations, when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            BindingError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
