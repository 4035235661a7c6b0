use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of evaluable entity a binding points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Policy,
    Group,
    User,
}

impl TargetKind {
    /// Every kind, in load-time inference priority.
    pub const PRIORITY: [TargetKind; 3] = [TargetKind::Policy, TargetKind::Group, TargetKind::User];

    /// Wire name of the foreign key field carrying this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Policy => "policy",
            TargetKind::Group => "group",
            TargetKind::User => "user",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy" => Ok(TargetKind::Policy),
            "group" => Ok(TargetKind::Group),
            "user" => Ok(TargetKind::User),
            other => Err(format!(
                "unknown target kind '{}', expected policy, group or user",
                other
            )),
        }
    }
}

/// The entity a binding evaluates.
///
/// Exactly one variant is populated by construction. The flat wire form
/// with three optional foreign keys only exists in [`crate::BindingPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum BindingTarget {
    Policy(String),
    Group(String),
    User(String),
}

impl BindingTarget {
    pub fn new(kind: TargetKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            TargetKind::Policy => BindingTarget::Policy(id),
            TargetKind::Group => BindingTarget::Group(id),
            TargetKind::User => BindingTarget::User(id),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            BindingTarget::Policy(_) => TargetKind::Policy,
            BindingTarget::Group(_) => TargetKind::Group,
            BindingTarget::User(_) => TargetKind::User,
        }
    }

    /// Primary key of the referenced entity.
    pub fn id(&self) -> &str {
        match self {
            BindingTarget::Policy(id) | BindingTarget::Group(id) | BindingTarget::User(id) => id,
        }
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_its_wire_name() {
        for kind in TargetKind::PRIORITY {
            assert_eq!(kind.as_str().parse::<TargetKind>(), Ok(kind));
        }
        assert!("role".parse::<TargetKind>().is_err());
    }

    #[test]
    fn default_kind_is_policy() {
        assert_eq!(TargetKind::default(), TargetKind::Policy);
    }

    #[test]
    fn target_reports_kind_and_id() {
        let target = BindingTarget::new(TargetKind::Group, "admins");
        assert_eq!(target, BindingTarget::Group("admins".to_string()));
        assert_eq!(target.kind(), TargetKind::Group);
        assert_eq!(target.id(), "admins");
        assert_eq!(target.to_string(), "group admins");
    }
}
