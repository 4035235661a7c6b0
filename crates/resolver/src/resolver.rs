use binding_model::{BindingPayload, BindingTarget, Field, TargetKind, ValidationErrors};
use tracing::{debug, warn};

/// Whether a resolver may switch between target kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverMode {
    #[default]
    Unrestricted,
    /// The active kind is pinned to policy; switching is a no-op.
    PolicyOnly,
}

/// First populated target kind of `payload`, checked policy, then group,
/// then user. `None` for a payload with no target.
pub fn infer_kind(payload: &BindingPayload) -> Option<TargetKind> {
    TargetKind::PRIORITY
        .into_iter()
        .find(|kind| payload.target_id(*kind).is_some())
}

/// Tri-state target selection for one binding edit.
///
/// Tracks the active kind and the entity chosen for each kind, so switching
/// away and back keeps the earlier choice. Only the active kind's selection
/// reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResolver {
    mode: ResolverMode,
    active: TargetKind,
    policy: Option<String>,
    group: Option<String>,
    user: Option<String>,
}

impl TargetResolver {
    /// A resolver for a new binding. The active kind starts at policy.
    pub fn new(mode: ResolverMode) -> Self {
        Self {
            mode,
            active: TargetKind::Policy,
            policy: None,
            group: None,
            user: None,
        }
    }

    /// A resolver for a loaded binding.
    ///
    /// The active kind is the first populated field by [`infer_kind`], or
    /// policy if none is. Payloads from the store should carry at most one
    /// target; more than one is stale data and resolves deterministically
    /// by the same priority.
    pub fn from_payload(payload: &BindingPayload, mode: ResolverMode) -> Self {
        let populated = payload.populated_kinds();
        if populated.len() > 1 {
            warn!(
                binding = payload.pk.as_deref().unwrap_or("<new>"),
                ?populated,
                "binding references more than one target"
            );
        }

        let active = match mode {
            ResolverMode::PolicyOnly => TargetKind::Policy,
            ResolverMode::Unrestricted => infer_kind(payload).unwrap_or_default(),
        };
        debug!(%active, ?mode, "inferred binding target kind");

        let owned = |kind| payload.target_id(kind).map(str::to_string);
        Self {
            mode,
            active,
            policy: owned(TargetKind::Policy),
            group: owned(TargetKind::Group),
            user: owned(TargetKind::User),
        }
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode
    }

    pub fn active_kind(&self) -> TargetKind {
        self.active
    }

    /// Make `kind` the active selection. Returns `false`, leaving the
    /// resolver untouched, in policy-only mode.
    pub fn set_active_kind(&mut self, kind: TargetKind) -> bool {
        if self.mode == ResolverMode::PolicyOnly {
            return false;
        }
        self.active = kind;
        true
    }

    /// Choose `id` as the entity for the active kind.
    pub fn select(&mut self, id: impl Into<String>) {
        let kind = self.active;
        *self.slot_mut(kind) = Some(id.into());
    }

    /// Forget the entity chosen for the active kind.
    pub fn clear_selection(&mut self) {
        let kind = self.active;
        *self.slot_mut(kind) = None;
    }

    /// Entity chosen for `kind`, whether or not it is active.
    pub fn selection(&self, kind: TargetKind) -> Option<&str> {
        let slot = match kind {
            TargetKind::Policy => &self.policy,
            TargetKind::Group => &self.group,
            TargetKind::User => &self.user,
        };
        slot.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn active_selection(&self) -> Option<&str> {
        self.selection(self.active)
    }

    /// The target this resolver would submit.
    ///
    /// No entity chosen for the active kind is a validation error on
    /// [`Field::Target`]; it is never filled in automatically.
    pub fn target(&self) -> Result<BindingTarget, ValidationErrors> {
        self.active_selection()
            .map(|id| BindingTarget::new(self.active, id))
            .ok_or_else(|| {
                ValidationErrors::single(Field::Target, format!("no {} selected", self.active))
            })
    }

    /// Write the active selection into `payload`, nulling the other two
    /// target fields. On error `payload` is left untouched.
    pub fn project(&self, payload: &mut BindingPayload) -> Result<(), ValidationErrors> {
        let target = self.target()?;
        payload.set_target(&target);
        Ok(())
    }

    fn slot_mut(&mut self, kind: TargetKind) -> &mut Option<String> {
        match kind {
            TargetKind::Policy => &mut self.policy,
            TargetKind::Group => &mut self.group,
            TargetKind::User => &mut self.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(policy: Option<&str>, group: Option<&str>, user: Option<&str>) -> BindingPayload {
        let mut payload = BindingPayload::new("flow-1");
        payload.policy = policy.map(str::to_string);
        payload.group = group.map(str::to_string);
        payload.user = user.map(str::to_string);
        payload
    }

    #[test]
    fn single_field_sets_matching_kind() {
        let cases = [
            (payload(Some("p"), None, None), TargetKind::Policy),
            (payload(None, Some("g"), None), TargetKind::Group),
            (payload(None, None, Some("u")), TargetKind::User),
        ];
        for (payload, expected) in cases {
            let resolver = TargetResolver::from_payload(&payload, ResolverMode::Unrestricted);
            assert_eq!(resolver.active_kind(), expected);
        }
    }

    #[test]
    fn empty_payload_defaults_to_policy() {
        let resolver =
            TargetResolver::from_payload(&payload(None, None, None), ResolverMode::Unrestricted);
        assert_eq!(resolver.active_kind(), TargetKind::Policy);
        assert_eq!(resolver.active_selection(), None);
    }

    #[test]
    fn multiple_fields_resolve_by_priority() {
        let cases = [
            (payload(Some("p"), Some("g"), Some("u")), TargetKind::Policy),
            (payload(Some("p"), None, Some("u")), TargetKind::Policy),
            (payload(None, Some("g"), Some("u")), TargetKind::Group),
        ];
        for (payload, expected) in cases {
            let resolver = TargetResolver::from_payload(&payload, ResolverMode::Unrestricted);
            assert_eq!(resolver.active_kind(), expected);
        }
    }

    #[test]
    fn policy_only_mode_pins_policy() {
        let group_binding = payload(None, Some("g"), None);
        let mut resolver = TargetResolver::from_payload(&group_binding, ResolverMode::PolicyOnly);
        assert_eq!(resolver.active_kind(), TargetKind::Policy);

        assert!(!resolver.set_active_kind(TargetKind::User));
        assert_eq!(resolver.active_kind(), TargetKind::Policy);
    }

    #[test]
    fn switching_kind_keeps_each_selection() {
        let mut resolver = TargetResolver::new(ResolverMode::Unrestricted);
        resolver.select("p-1");
        assert!(resolver.set_active_kind(TargetKind::Group));
        resolver.select("g-1");

        assert_eq!(resolver.active_selection(), Some("g-1"));
        assert_eq!(resolver.selection(TargetKind::Policy), Some("p-1"));

        resolver.set_active_kind(TargetKind::Policy);
        assert_eq!(resolver.target().unwrap(), BindingTarget::Policy("p-1".to_string()));
    }

    #[test]
    fn project_writes_only_active_kind() {
        let mut resolver = TargetResolver::new(ResolverMode::Unrestricted);
        resolver.select("p-1");
        resolver.set_active_kind(TargetKind::User);
        resolver.select("12");

        let mut out = payload(Some("stale"), Some("stale"), None);
        resolver.project(&mut out).unwrap();
        assert_eq!(out.policy, None);
        assert_eq!(out.group, None);
        assert_eq!(out.user.as_deref(), Some("12"));
    }

    #[test]
    fn project_without_selection_fails_and_keeps_payload() {
        let mut resolver = TargetResolver::new(ResolverMode::Unrestricted);
        resolver.select("p-1");
        resolver.set_active_kind(TargetKind::Group);

        let mut out = payload(Some("p-0"), None, None);
        let errors = resolver.project(&mut out).unwrap_err();
        assert_eq!(
            errors.messages_for(Field::Target).collect::<Vec<_>>(),
            vec!["no group selected"]
        );
        assert_eq!(out.policy.as_deref(), Some("p-0"));
    }

    #[test]
    fn projection_survives_reload() {
        let cases = [
            (TargetKind::Policy, "p-1"),
            (TargetKind::Group, "g-1"),
            (TargetKind::User, "3"),
        ];
        for (kind, id) in cases {
            let mut resolver = TargetResolver::new(ResolverMode::Unrestricted);
            resolver.set_active_kind(kind);
            resolver.select(id);

            let mut out = BindingPayload::new("flow-1");
            resolver.project(&mut out).unwrap();
            let reloaded = TargetResolver::from_payload(&out, ResolverMode::Unrestricted);
            assert_eq!(reloaded.active_kind(), kind);
            assert_eq!(reloaded.active_selection(), Some(id));
        }
    }

    #[test]
    fn cleared_selection_is_a_validation_error() {
        let loaded = payload(Some("p-1"), None, None);
        let mut resolver = TargetResolver::from_payload(&loaded, ResolverMode::PolicyOnly);
        resolver.clear_selection();
        assert!(resolver.target().unwrap_err().has(Field::Target));
    }
}
