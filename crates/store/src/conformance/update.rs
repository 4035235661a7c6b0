use std::future::Future;

use super::{create, group_binding, policy_binding, TestResult};
use crate::{BindingStore, StoreError};

pub(super) async fn run_update_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "update",
            "update_replaces_fields",
            update_replaces_fields(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_switches_target_kind",
            update_switches_target_kind(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_keeps_order_when_unchanged",
            update_keeps_order_when_unchanged(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_cannot_change_parent",
            update_cannot_change_parent(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_with_two_targets_is_rejected",
            update_with_two_targets_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_unknown_returns_not_found",
            update_unknown_returns_not_found(factory).await,
        ),
    ]
}

async fn update_replaces_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-1", 0)).await?;

    let mut changed = policy_binding("flow-1", "p-2", 7);
    changed.negate = true;
    s.update_binding(&pk, changed)
        .await
        .map_err(|e| format!("update: {e}"))?;

    let fetched = s.fetch_binding(&pk).await.map_err(|e| e.to_string())?;
    if fetched.policy.as_deref() != Some("p-2") || fetched.order != 7 || !fetched.negate {
        return Err(format!("update not applied: {fetched:?}"));
    }
    if fetched.pk.as_deref() != Some(pk.as_str()) {
        return Err(format!("pk changed on update: {:?}", fetched.pk));
    }
    Ok(())
}

/// Moving a binding from a policy to a group must clear the policy field.
async fn update_switches_target_kind<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-1", 2)).await?;
    s.update_binding(&pk, group_binding("flow-1", "g-1", 2))
        .await
        .map_err(|e| format!("update: {e}"))?;

    let fetched = s.fetch_binding(&pk).await.map_err(|e| e.to_string())?;
    if fetched.policy.is_some() || fetched.group.as_deref() != Some("g-1") {
        return Err(format!("target kind not switched: {fetched:?}"));
    }
    Ok(())
}

async fn update_keeps_order_when_unchanged<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-1", 3)).await?;
    let mut loaded = s.fetch_binding(&pk).await.map_err(|e| e.to_string())?;
    loaded.enabled = false;
    let updated = s
        .update_binding(&pk, loaded)
        .await
        .map_err(|e| format!("update: {e}"))?;
    if updated.order != 3 {
        return Err(format!("expected order 3, got {}", updated.order));
    }
    Ok(())
}

async fn update_cannot_change_parent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    match s.update_binding(&pk, policy_binding("flow-2", "p-1", 0)).await {
        Err(StoreError::Rejected { .. }) => {}
        Err(e) => return Err(format!("expected Rejected, got {e}")),
        Ok(b) => return Err(format!("parent was changed: {b:?}")),
    }
    let fetched = s.fetch_binding(&pk).await.map_err(|e| e.to_string())?;
    if fetched.parent.as_deref() != Some("flow-1") {
        return Err(format!("parent changed to {:?}", fetched.parent));
    }
    Ok(())
}

async fn update_with_two_targets_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    let mut payload = policy_binding("flow-1", "p-1", 0);
    payload.group = Some("g-1".to_string());
    match s.update_binding(&pk, payload).await {
        Err(StoreError::Rejected { .. }) => Ok(()),
        Err(e) => Err(format!("expected Rejected, got {e}")),
        Ok(b) => Err(format!("expected Rejected, got {b:?}")),
    }
}

async fn update_unknown_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .update_binding("missing", policy_binding("flow-1", "p-1", 0))
        .await
    {
        Err(StoreError::NotFound { .. }) => Ok(()),
        Err(e) => Err(format!("expected NotFound, got {e}")),
        Ok(b) => Err(format!("expected NotFound, got {b:?}")),
    }
}
