use std::future::Future;

use super::{create, group_binding, policy_binding, user_binding, TestResult};
use crate::BindingStore;

pub(super) async fn run_list_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "list",
            "list_unknown_parent_is_empty",
            list_unknown_parent_is_empty(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_is_scoped_to_parent",
            list_is_scoped_to_parent(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_includes_every_target_kind",
            list_includes_every_target_kind(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_is_sorted_by_order",
            list_is_sorted_by_order(factory).await,
        ),
    ]
}

async fn list_unknown_parent_is_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let siblings = s.list_bindings("nothing-here").await.map_err(|e| e.to_string())?;
    if !siblings.is_empty() {
        return Err(format!("expected no bindings, got {}", siblings.len()));
    }
    Ok(())
}

async fn list_is_scoped_to_parent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    create(&s, policy_binding("flow-2", "p-1", 0)).await?;
    create(&s, policy_binding("flow-1", "p-2", 1)).await?;

    let siblings = s.list_bindings("flow-1").await.map_err(|e| e.to_string())?;
    if siblings.len() != 2 {
        return Err(format!("expected 2 bindings for flow-1, got {}", siblings.len()));
    }
    if siblings
        .iter()
        .any(|b| b.parent.as_deref() != Some("flow-1"))
    {
        return Err("list returned a binding of another parent".to_string());
    }
    Ok(())
}

async fn list_includes_every_target_kind<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    create(&s, policy_binding("flow-1", "p-1", 0)).await?;
    create(&s, group_binding("flow-1", "g-1", 1)).await?;
    create(&s, user_binding("flow-1", "7", 2)).await?;

    let siblings = s.list_bindings("flow-1").await.map_err(|e| e.to_string())?;
    let has_policy = siblings.iter().any(|b| b.policy.is_some());
    let has_group = siblings.iter().any(|b| b.group.is_some());
    let has_user = siblings.iter().any(|b| b.user.is_some());
    if !(has_policy && has_group && has_user) {
        return Err(format!(
            "expected policy, group and user bindings, got {siblings:?}"
        ));
    }
    Ok(())
}

async fn list_is_sorted_by_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BindingStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for order in [5, -1, 2, 2, 0] {
        create(&s, policy_binding("flow-1", "p-1", order)).await?;
    }

    let orders: Vec<i64> = s
        .list_bindings("flow-1")
        .await
        .map_err(|e| e.to_string())?
        .iter()
        .map(|b| b.order)
        .collect();
    if orders != vec![-1, 0, 2, 2, 5] {
        return Err(format!("expected ascending orders, got {orders:?}"));
    }
    Ok(())
}
