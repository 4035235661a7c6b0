use std::fmt;

use serde::Serialize;

use crate::payload::BindingPayload;

pub(crate) const MISSING_TARGET: &str = "one of policy, group or user must be set";

/// The binding field a validation failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The policy/group/user selection.
    Target,
    Parent,
    Order,
    Timeout,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Target => "target",
            Field::Parent => "parent",
            Field::Order => "order",
            Field::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// A single rule violation, attached to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every rule violation found on a binding. Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether any violation was reported against `field`.
    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages reported against `field`, in the order they were found.
    pub fn messages_for(&self, field: Field) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was reported, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl Extend<FieldError> for ValidationErrors {
    fn extend<T: IntoIterator<Item = FieldError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

impl BindingPayload {
    /// Check every submission rule and report all violations at once.
    ///
    /// - exactly one of `policy`, `group`, `user` is populated
    /// - the parent is present
    /// - the timeout is a positive number of seconds
    ///
    /// `order` may take any sign. Its integer type is enforced when the
    /// payload is built or deserialized, so there is nothing left to check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.populated_kinds().as_slice() {
            [_] => {}
            [] => errors.push(Field::Target, MISSING_TARGET),
            many => {
                let names: Vec<&str> = many.iter().map(|k| k.as_str()).collect();
                errors.push(
                    Field::Target,
                    format!(
                        "only one of policy, group or user can be set, found {}",
                        names.join(", ")
                    ),
                );
            }
        }

        if self.parent.as_deref().is_none_or(|p| p.trim().is_empty()) {
            errors.push(Field::Parent, "parent is required");
        }

        if self.timeout_seconds <= 0 {
            errors.push(Field::Timeout, "timeout must be a positive number of seconds");
        } else if self.timeout_seconds > i64::from(u32::MAX) {
            errors.push(Field::Timeout, "timeout is out of range");
        }

        errors.into_result()
    }
}
