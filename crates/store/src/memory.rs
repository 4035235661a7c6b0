use std::collections::HashMap;

use async_trait::async_trait;
use binding_model::{BindingPayload, CandidateEntity, TargetKind};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::query::{CandidateOrdering, CandidatePage, CandidateQuery};
use crate::traits::{BindingStore, CandidateCatalog};

/// In-process binding store and candidate catalog.
///
/// Bindings keep insertion order so that siblings with equal `order`
/// list in a stable sequence. Locks are only held for the duration of a
/// single call, never across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bindings: RwLock<Vec<BindingPayload>>,
    next_id: RwLock<u64>,
    candidates: RwLock<HashMap<TargetKind, Vec<CandidateEntity>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog with candidates of `kind`.
    pub fn with_candidates(
        mut self,
        kind: TargetKind,
        candidates: impl IntoIterator<Item = CandidateEntity>,
    ) -> Self {
        self.candidates
            .get_mut()
            .entry(kind)
            .or_default()
            .extend(candidates);
        self
    }

    /// Seed existing bindings, keeping any `pk` they carry.
    ///
    /// Bindings without one get a generated key that no seeded binding uses.
    pub fn with_bindings(mut self, bindings: impl IntoIterator<Item = BindingPayload>) -> Self {
        let seeded = self.bindings.get_mut();
        let first = seeded.len();
        seeded.extend(bindings);

        let next_id = self.next_id.get_mut();
        for i in first..seeded.len() {
            if seeded[i].pk.is_none() {
                let id = fresh_id(seeded, next_id);
                seeded[i].pk = Some(id);
            }
        }
        self
    }

    /// Number of stored bindings across all parents.
    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bindings.read().await.is_empty()
    }
}

/// Next generated key not already held by a binding.
fn fresh_id(bindings: &[BindingPayload], next_id: &mut u64) -> String {
    loop {
        *next_id += 1;
        let id = format!("binding-{next_id}");
        if !bindings.iter().any(|b| b.pk.as_deref() == Some(id.as_str())) {
            return id;
        }
    }
}

fn check_payload(payload: &BindingPayload) -> Result<(), StoreError> {
    payload
        .validate()
        .map_err(|errors| StoreError::rejected(errors.to_string()))
}

#[async_trait]
impl BindingStore for MemoryStore {
    async fn fetch_binding(&self, id: &str) -> Result<BindingPayload, StoreError> {
        self.bindings
            .read()
            .await
            .iter()
            .find(|b| b.pk.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn list_bindings(&self, parent: &str) -> Result<Vec<BindingPayload>, StoreError> {
        let mut siblings: Vec<BindingPayload> = self
            .bindings
            .read()
            .await
            .iter()
            .filter(|b| b.parent.as_deref() == Some(parent))
            .cloned()
            .collect();
        // Stable: equal orders keep insertion order.
        siblings.sort_by_key(|b| b.order);
        Ok(siblings)
    }

    async fn create_binding(
        &self,
        mut payload: BindingPayload,
    ) -> Result<BindingPayload, StoreError> {
        check_payload(&payload)?;

        let id = {
            let mut bindings = self.bindings.write().await;
            let mut next_id = self.next_id.write().await;
            let id = fresh_id(&bindings, &mut next_id);
            payload.pk = Some(id.clone());
            bindings.push(payload.clone());
            id
        };

        debug!(binding = %id, order = payload.order, "created binding");
        Ok(payload)
    }

    async fn update_binding(
        &self,
        id: &str,
        mut payload: BindingPayload,
    ) -> Result<BindingPayload, StoreError> {
        check_payload(&payload)?;

        let mut bindings = self.bindings.write().await;
        let existing = bindings
            .iter_mut()
            .find(|b| b.pk.as_deref() == Some(id))
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if existing.parent != payload.parent {
            return Err(StoreError::rejected("parent of a binding cannot be changed"));
        }

        payload.pk = Some(id.to_string());
        *existing = payload.clone();

        debug!(binding = %id, order = payload.order, "updated binding");
        Ok(payload)
    }
}

#[async_trait]
impl CandidateCatalog for MemoryStore {
    async fn list_candidates(
        &self,
        kind: TargetKind,
        query: &CandidateQuery,
    ) -> Result<CandidatePage, StoreError> {
        if query.page == 0 || query.page_size == 0 {
            return Err(StoreError::rejected(format!(
                "invalid page request: page {} of size {}",
                query.page, query.page_size
            )));
        }

        let mut all = self
            .candidates
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        match query.ordering {
            CandidateOrdering::PrimaryKey => all.sort_by(CandidateEntity::cmp_pk),
            CandidateOrdering::Name => all.sort_by(|a, b| {
                a.display_name
                    .cmp(&b.display_name)
                    .then_with(|| a.cmp_pk(b))
            }),
        }

        let count = all.len();
        let size = query.page_size as usize;
        let start = (query.page as usize - 1).saturating_mul(size);
        let end = start.saturating_add(size).min(count);
        let results = if start < count {
            all[start..end].to_vec()
        } else {
            Vec::new()
        };
        let next = (end < count).then_some(query.page + 1);

        debug!(%kind, page = query.page, returned = results.len(), "listed candidates");
        Ok(CandidatePage {
            results,
            next,
            count,
        })
    }
}
