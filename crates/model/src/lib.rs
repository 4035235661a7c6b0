//! Binding model -- the records that attach an evaluable entity (policy,
//! group or user) to a parent object (flow, stage or prompt).
//!
//! Two shapes of the same data live here:
//!
//! - [`BindingRecord`] -- the validated, in-memory form. Its target is a
//!   [`BindingTarget`] sum type, so a record can never reference more than
//!   one entity.
//! - [`BindingPayload`] -- the flat wire form exchanged with the remote
//!   store, with three optional foreign keys (`policy`, `group`, `user`).
//!
//! [`BindingPayload::validate`] gates the conversion between the two and
//! reports every violation per field.

mod candidate;
mod payload;
mod record;
mod target;
mod validate;

pub use candidate::CandidateEntity;
pub use payload::BindingPayload;
pub use record::{BindingRecord, DEFAULT_TIMEOUT_SECONDS};
pub use target::{BindingTarget, TargetKind};
pub use validate::{Field, FieldError, ValidationErrors};
