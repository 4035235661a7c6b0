//! Binding target resolution and ordering.
//!
//! - [`TargetResolver`] keeps the exactly-one-target invariant through an
//!   edit: it infers the active kind from a loaded payload and projects the
//!   selection back onto the wire form on save.
//! - [`order`] assigns a new binding the next order among its siblings.
//! - [`candidates`] enumerates selectable policies, groups and users from
//!   the catalog, grouping policies by classification.
//! - [`BindingEditor`] ties these together over a [`binding_store::BindingStore`]
//!   and [`binding_store::CandidateCatalog`] for one create or edit session.

pub mod candidates;
mod config;
mod editor;
mod error;
pub mod order;
mod resolver;

pub use candidates::{CandidateGroup, CandidatePager, CandidateSet};
pub use config::{BindingDefaults, ConfigError, ResolverConfig, ResolverSettings};
pub use editor::{BindingDraft, BindingEditor, CandidateSections, Prepared};
pub use error::{BindingError, Section};
pub use resolver::{infer_kind, ResolverMode, TargetResolver};
