use std::fmt;

use serde::{Deserialize, Serialize};

use crate::payload::BindingPayload;
use crate::target::{BindingTarget, TargetKind};
use crate::validate::{Field, ValidationErrors, MISSING_TARGET};

/// Timeout applied to new bindings unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 30;

/// A validated binding: one parent, exactly one target, and the metadata
/// the evaluation engine reads.
///
/// Siblings sharing a `parent` are ranked by `order`, lower first. Orders
/// are not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    pub id: Option<String>,
    pub parent: String,
    pub target: BindingTarget,
    pub order: i64,
    pub enabled: bool,
    pub negate: bool,
    pub timeout_seconds: u32,
}

impl BindingRecord {
    /// A fresh, unsaved record with the construction defaults.
    pub fn new(parent: impl Into<String>, target: BindingTarget) -> Self {
        Self {
            id: None,
            parent: parent.into(),
            target,
            order: 0,
            enabled: true,
            negate: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn to_payload(&self) -> BindingPayload {
        let mut payload = BindingPayload {
            pk: self.id.clone(),
            parent: Some(self.parent.clone()),
            policy: None,
            group: None,
            user: None,
            order: self.order,
            enabled: self.enabled,
            negate: self.negate,
            timeout_seconds: i64::from(self.timeout_seconds),
        };
        payload.set_target(&self.target);
        payload
    }
}

impl TryFrom<BindingPayload> for BindingRecord {
    type Error = ValidationErrors;

    /// Strict conversion: every rule of [`BindingPayload::validate`] must hold.
    fn try_from(payload: BindingPayload) -> Result<Self, Self::Error> {
        payload.validate()?;

        let target = TargetKind::PRIORITY
            .into_iter()
            .find_map(|kind| payload.target_id(kind).map(|id| BindingTarget::new(kind, id)))
            .ok_or_else(|| ValidationErrors::single(Field::Target, MISSING_TARGET))?;
        let timeout_seconds = u32::try_from(payload.timeout_seconds)
            .map_err(|_| ValidationErrors::single(Field::Timeout, "timeout is out of range"))?;

        Ok(Self {
            id: payload.pk,
            parent: payload.parent.unwrap_or_default(),
            target,
            order: payload.order,
            enabled: payload.enabled,
            negate: payload.negate,
            timeout_seconds,
        })
    }
}

impl fmt::Display for BindingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Binding from {} #{} to {}",
            self.target, self.order, self.parent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_has_defaults() {
        let record = BindingRecord::new("flow-1", BindingTarget::Policy("p-1".to_string()));
        assert_eq!(record.id, None);
        assert!(record.enabled);
        assert!(!record.negate);
        assert_eq!(record.timeout_seconds, 30);
        assert_eq!(record.order, 0);
    }

    #[test]
    fn payload_conversion_keeps_single_target() {
        let mut record = BindingRecord::new("stage-3", BindingTarget::User("42".to_string()))
            .with_order(-1);
        record.negate = true;
        record.timeout_seconds = 5;

        let payload = record.to_payload();
        assert_eq!(payload.populated_kinds(), vec![TargetKind::User]);
        assert_eq!(payload.timeout_seconds, 5);

        let back = BindingRecord::try_from(payload).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn conversion_rejects_ambiguous_payload() {
        let mut payload = BindingPayload::new("flow-1");
        payload.policy = Some("p-1".to_string());
        payload.group = Some("g-1".to_string());

        let errors = BindingRecord::try_from(payload).unwrap_err();
        assert!(errors.has(Field::Target));
    }

    #[test]
    fn conversion_rejects_oversized_timeout() {
        let mut payload = BindingPayload::new("flow-1");
        payload.policy = Some("p-1".to_string());
        payload.timeout_seconds = i64::from(u32::MAX) + 1;

        let errors = BindingRecord::try_from(payload).unwrap_err();
        assert!(errors.has(Field::Timeout));
    }

    #[test]
    fn display_names_target_order_and_parent() {
        let record =
            BindingRecord::new("flow-1", BindingTarget::Group("g-1".to_string())).with_order(3);
        assert_eq!(record.to_string(), "Binding from group g-1 #3 to flow-1");
    }
}
