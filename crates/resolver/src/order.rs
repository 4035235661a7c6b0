//! Order assignment for new bindings.
//!
//! A new binding goes after every existing sibling: `max(orders) + 1`, or
//! `0` for a parent with no bindings. Edits keep their stored order.
//!
//! Two clients creating against the same parent at the same time can both
//! read the same maximum and submit the same order. The store accepts both
//! (last write wins, no optimistic locking here). Orders are a sort key,
//! not a unique key, so the evaluation engine sees a tie rather than an
//! error.

use binding_store::{BindingStore, StoreError};
use tracing::debug;

/// The order following every value in `orders`, or `0` when empty.
///
/// Saturates at `i64::MAX`.
pub fn next_order(orders: impl IntoIterator<Item = i64>) -> i64 {
    orders
        .into_iter()
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Order to submit for a binding of `parent`.
///
/// `stored` is the order already held by the binding: for an edit it is
/// returned unchanged and the store is not queried. For a new binding
/// (`None`) every sibling of `parent` is listed, whatever its target kind.
pub async fn assign_order<S>(
    store: &S,
    parent: &str,
    stored: Option<i64>,
) -> Result<i64, StoreError>
where
    S: BindingStore + ?Sized,
{
    if let Some(order) = stored {
        return Ok(order);
    }

    let siblings = store.list_bindings(parent).await?;
    let order = next_order(siblings.iter().map(|b| b.order));
    debug!(parent, siblings = siblings.len(), order, "assigned binding order");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binding_model::BindingPayload;
    use binding_store::MemoryStore;

    fn sibling(parent: &str, order: i64) -> BindingPayload {
        let mut payload = BindingPayload::new(parent);
        payload.policy = Some("p-1".to_string());
        payload.order = order;
        payload
    }

    #[test]
    fn next_order_follows_maximum() {
        assert_eq!(next_order([0, 2, 5]), 6);
        assert_eq!(next_order([5, 2, 0]), 6);
        assert_eq!(next_order([-7, -3]), -2);
        assert_eq!(next_order([4, 4]), 5);
    }

    #[test]
    fn next_order_of_nothing_is_zero() {
        assert_eq!(next_order(std::iter::empty()), 0);
    }

    #[test]
    fn next_order_saturates() {
        assert_eq!(next_order([i64::MAX]), i64::MAX);
    }

    #[tokio::test]
    async fn new_binding_goes_after_siblings() {
        let store = MemoryStore::new().with_bindings(vec![
            sibling("flow-1", 0),
            sibling("flow-1", 2),
            sibling("flow-1", 5),
            sibling("flow-2", 40),
        ]);
        assert_eq!(assign_order(&store, "flow-1", None).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn first_binding_gets_zero() {
        let store = MemoryStore::new();
        assert_eq!(assign_order(&store, "flow-1", None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn siblings_of_every_kind_count() {
        let mut user = BindingPayload::new("flow-1");
        user.user = Some("9".to_string());
        user.order = 11;
        let store = MemoryStore::new().with_bindings(vec![sibling("flow-1", 3), user]);
        assert_eq!(assign_order(&store, "flow-1", None).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn stored_order_is_kept() {
        let store = MemoryStore::new().with_bindings(vec![sibling("flow-1", 10)]);
        assert_eq!(assign_order(&store, "flow-1", Some(3)).await.unwrap(), 3);
    }
}
