use serde::{Deserialize, Serialize};

use crate::record::DEFAULT_TIMEOUT_SECONDS;
use crate::target::{BindingTarget, TargetKind};

/// The flat wire form of a binding, as exchanged with the remote store.
///
/// Field names follow the store's API: the owning flow/stage/prompt is
/// called `target` on the wire, and the evaluable entity is carried in
/// three optional foreign keys. A well-formed payload has exactly one of
/// `policy`, `group`, `user` populated; see [`BindingPayload::validate`].
///
/// `order` has no default: a payload whose order is missing or not an
/// integer fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingPayload {
    /// Assigned by the store. Absent for bindings that were never created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<String>,
    #[serde(rename = "target", default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    pub order: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub negate: bool,
    #[serde(rename = "timeout", default = "default_timeout")]
    pub timeout_seconds: i64,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> i64 {
    DEFAULT_TIMEOUT_SECONDS as i64
}

impl BindingPayload {
    /// A blank, not-yet-created payload for `parent` with the record defaults
    /// and no target.
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            pk: None,
            parent: Some(parent.into()),
            policy: None,
            group: None,
            user: None,
            order: 0,
            enabled: default_enabled(),
            negate: false,
            timeout_seconds: default_timeout(),
        }
    }

    /// The foreign key stored for `kind`, if populated.
    ///
    /// Blank strings count as unpopulated; form submissions commonly send
    /// `""` for an unselected field.
    pub fn target_id(&self, kind: TargetKind) -> Option<&str> {
        let field = match kind {
            TargetKind::Policy => &self.policy,
            TargetKind::Group => &self.group,
            TargetKind::User => &self.user,
        };
        field.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Every kind with a populated foreign key, in inference priority.
    pub fn populated_kinds(&self) -> Vec<TargetKind> {
        TargetKind::PRIORITY
            .into_iter()
            .filter(|kind| self.target_id(*kind).is_some())
            .collect()
    }

    /// Write `target` into its foreign key and null the other two.
    ///
    /// This is the only place the target sum type is flattened into the
    /// wire representation.
    pub fn set_target(&mut self, target: &BindingTarget) {
        self.policy = None;
        self.group = None;
        self.user = None;
        let id = Some(target.id().to_string());
        match target.kind() {
            TargetKind::Policy => self.policy = id,
            TargetKind::Group => self.group = id,
            TargetKind::User => self.user = id,
        }
    }

    /// Clear all three foreign keys.
    pub fn clear_target(&mut self) {
        self.policy = None;
        self.group = None;
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_payload_carries_record_defaults() {
        let payload = BindingPayload::new("flow-1");
        assert_eq!(payload.parent.as_deref(), Some("flow-1"));
        assert!(payload.enabled);
        assert!(!payload.negate);
        assert_eq!(payload.timeout_seconds, 30);
        assert!(payload.populated_kinds().is_empty());
    }

    #[test]
    fn set_target_nulls_the_other_fields() {
        let mut payload = BindingPayload::new("flow-1");
        payload.policy = Some("p-1".to_string());
        payload.user = Some("7".to_string());

        payload.set_target(&BindingTarget::Group("g-1".to_string()));

        assert_eq!(payload.policy, None);
        assert_eq!(payload.group.as_deref(), Some("g-1"));
        assert_eq!(payload.user, None);
        assert_eq!(payload.populated_kinds(), vec![TargetKind::Group]);
    }

    #[test]
    fn blank_foreign_keys_are_unpopulated() {
        let mut payload = BindingPayload::new("flow-1");
        payload.policy = Some(String::new());
        payload.group = Some("  ".to_string());
        payload.user = Some("3".to_string());
        assert_eq!(payload.populated_kinds(), vec![TargetKind::User]);
    }

    #[test]
    fn serializes_with_store_field_names() {
        let mut payload = BindingPayload::new("flow-1");
        payload.set_target(&BindingTarget::Policy("p-1".to_string()));
        payload.order = 4;

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "target": "flow-1",
                "policy": "p-1",
                "group": null,
                "user": null,
                "order": 4,
                "enabled": true,
                "negate": false,
                "timeout": 30
            })
        );
    }

    #[test]
    fn missing_flags_deserialize_to_defaults() {
        let payload: BindingPayload = serde_json::from_value(json!({
            "pk": "b-1",
            "target": "stage-9",
            "user": "12",
            "order": -2
        }))
        .unwrap();
        assert_eq!(payload.pk.as_deref(), Some("b-1"));
        assert_eq!(payload.order, -2);
        assert!(payload.enabled);
        assert!(!payload.negate);
        assert_eq!(payload.timeout_seconds, 30);
    }

    #[test]
    fn non_integer_order_is_rejected() {
        let result: Result<BindingPayload, _> = serde_json::from_value(json!({
            "target": "flow-1",
            "policy": "p-1",
            "order": 1.5
        }));
        assert!(result.is_err());

        let missing: Result<BindingPayload, _> = serde_json::from_value(json!({
            "target": "flow-1",
            "policy": "p-1"
        }));
        assert!(missing.is_err());
    }
}
