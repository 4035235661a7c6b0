use std::future::Future;

use binding_model::BindingPayload;

use super::{create, group_binding, policy_binding, TestResult};
use crate::{BindingStore, StoreError};

pub(super) async fn run_create_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "create",
            "create_assigns_distinct_pks",
            create_assigns_distinct_pks(factory).await,
        ),
        TestResult::from_result(
            "create",
            "create_preserves_fields",
            create_preserves_fields(factory).await,
        ),
        TestResult::from_result(
            "create",
            "created_binding_is_fetchable",
            created_binding_is_fetchable(factory).await,
        ),
        TestResult::from_result(
            "create",
            "create_without_target_is_rejected",
            create_without_target_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "create",
            "create_with_two_targets_is_rejected",
            create_with_two_targets_is_rejected(factory).await,
        ),
        TestResult::from_result(
            "create",
            "fetch_unknown_returns_not_found",
            fetch_unknown_returns_not_found(factory).await,
        ),
    ]
}

async fn create_assigns_distinct_pks<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let a = create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    let b = create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    if a == b {
        return Err(format!("two creates returned the same pk '{a}'"));
    }
    Ok(())
}

async fn create_preserves_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut payload = group_binding("stage-1", "g-1", -4);
    payload.enabled = false;
    payload.negate = true;
    payload.timeout_seconds = 12;

    let created = s
        .create_binding(payload.clone())
        .await
        .map_err(|e| e.to_string())?;
    let expected = BindingPayload {
        pk: created.pk.clone(),
        ..payload
    };
    if created != expected {
        return Err(format!("expected {expected:?}, got {created:?}"));
    }
    Ok(())
}

async fn created_binding_is_fetchable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let pk = create(&s, policy_binding("flow-1", "p-9", 3)).await?;
    let fetched = s.fetch_binding(&pk).await.map_err(|e| e.to_string())?;
    if fetched.policy.as_deref() != Some("p-9") || fetched.order != 3 {
        return Err(format!("fetched binding does not match: {fetched:?}"));
    }
    Ok(())
}

async fn create_without_target_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.create_binding(BindingPayload::new("flow-1")).await {
        Err(StoreError::Rejected { .. }) => Ok(()),
        Err(e) => Err(format!("expected Rejected, got {e}")),
        Ok(b) => Err(format!("expected Rejected, got created binding {b:?}")),
    }
}

async fn create_with_two_targets_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut payload = policy_binding("flow-1", "p-1", 0);
    payload.user = Some("5".to_string());
    match s.create_binding(payload).await {
        Err(StoreError::Rejected { .. }) => Ok(()),
        Err(e) => Err(format!("expected Rejected, got {e}")),
        Ok(b) => Err(format!("expected Rejected, got created binding {b:?}")),
    }
}

async fn fetch_unknown_returns_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.fetch_binding("missing").await {
        Err(StoreError::NotFound { id }) if id == "missing" => Ok(()),
        Err(e) => Err(format!("expected NotFound(missing), got {e}")),
        Ok(b) => Err(format!("expected NotFound, got {b:?}")),
    }
}
