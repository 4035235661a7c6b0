//! Candidate enumeration for the target selector.
//!
//! Each kind is listed independently from the catalog, ordered by primary
//! key, and nothing is cached: every call fetches again. Policy candidates
//! are sectioned by classification in order of first appearance; groups and
//! users stay a flat list.

use std::collections::HashMap;

use binding_model::{CandidateEntity, TargetKind};
use binding_store::{CandidateCatalog, CandidateOrdering, CandidateQuery, StoreError};
use tracing::{debug, warn};

use crate::error::{BindingError, Section};

/// Policy candidates sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    /// Classification label, empty for candidates without one.
    pub label: String,
    pub candidates: Vec<CandidateEntity>,
}

/// Selectable candidates for one target kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSet {
    Grouped(Vec<CandidateGroup>),
    Flat(Vec<CandidateEntity>),
}

impl CandidateSet {
    /// Shape `candidates` the way `kind` is presented.
    pub fn for_kind(kind: TargetKind, candidates: Vec<CandidateEntity>) -> Self {
        match kind {
            TargetKind::Policy => CandidateSet::Grouped(group_by_classification(candidates)),
            TargetKind::Group | TargetKind::User => CandidateSet::Flat(candidates),
        }
    }

    /// Every candidate, in presentation order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &CandidateEntity> + '_> {
        match self {
            CandidateSet::Grouped(groups) => {
                Box::new(groups.iter().flat_map(|g| g.candidates.iter()))
            }
            CandidateSet::Flat(candidates) => Box::new(candidates.iter()),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.iter().any(|c| c.id == id)
    }
}

/// Partition `candidates` by classification.
///
/// Groups come out in the order their label is first seen; members keep
/// their input order. A missing classification falls into the `""` group.
pub fn group_by_classification(candidates: Vec<CandidateEntity>) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in candidates {
        let label = candidate.classification.clone().unwrap_or_default();
        let slot = *index.entry(label.clone()).or_insert_with(|| {
            groups.push(CandidateGroup {
                label,
                candidates: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].candidates.push(candidate);
    }

    groups
}

/// Lazy, restartable walk over the catalog pages of one kind.
pub struct CandidatePager<'a, C: ?Sized> {
    catalog: &'a C,
    kind: TargetKind,
    query: CandidateQuery,
    next: Option<u32>,
}

impl<'a, C> CandidatePager<'a, C>
where
    C: CandidateCatalog + ?Sized,
{
    pub fn new(catalog: &'a C, kind: TargetKind, page_size: u32) -> Self {
        let query = CandidateQuery::first(page_size);
        Self {
            catalog,
            kind,
            next: Some(query.page),
            query,
        }
    }

    pub fn with_ordering(mut self, ordering: CandidateOrdering) -> Self {
        self.query = self.query.with_ordering(ordering);
        self
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Rewind to the first page.
    pub fn restart(&mut self) {
        self.next = Some(1);
    }

    /// Fetch the next page. `Ok(None)` once every page has been read.
    ///
    /// A failed fetch leaves the position unchanged, so calling again
    /// retries the same page.
    pub async fn next_page(&mut self) -> Result<Option<Vec<CandidateEntity>>, StoreError> {
        let Some(page) = self.next else {
            return Ok(None);
        };
        let query = self.query.at_page(page);
        let fetched = self.catalog.list_candidates(self.kind, &query).await?;

        // A catalog pointing backwards would loop forever.
        self.next = fetched.next.filter(|next| *next > page);
        debug!(
            kind = %self.kind,
            page,
            returned = fetched.results.len(),
            "fetched candidate page"
        );
        Ok(Some(fetched.results))
    }

    /// Restart and read every page.
    pub async fn collect_all(&mut self) -> Result<Vec<CandidateEntity>, StoreError> {
        self.restart();
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }
}

/// Fetch and shape every candidate of `kind`.
pub async fn enumerate_candidates<C>(
    catalog: &C,
    kind: TargetKind,
    page_size: u32,
) -> Result<CandidateSet, StoreError>
where
    C: CandidateCatalog + ?Sized,
{
    let candidates = CandidatePager::new(catalog, kind, page_size)
        .collect_all()
        .await?;
    Ok(CandidateSet::for_kind(kind, candidates))
}

/// [`enumerate_candidates`] with the failure attributed to its section.
pub(crate) async fn load_section<C>(
    catalog: &C,
    kind: TargetKind,
    page_size: u32,
) -> Result<CandidateSet, BindingError>
where
    C: CandidateCatalog + ?Sized,
{
    enumerate_candidates(catalog, kind, page_size)
        .await
        .map_err(|source| {
            warn!(%kind, error = %source, "candidate enumeration failed");
            BindingError::fetch(Section::Candidates(kind))(source)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use binding_store::MemoryStore;

    fn classified(id: &str, class: &str) -> CandidateEntity {
        CandidateEntity::new(id, id).with_classification(class)
    }

    fn ids(candidates: &[CandidateEntity]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn groups_follow_encounter_order() {
        let groups = group_by_classification(vec![
            classified("1", "A"),
            classified("2", "B"),
            classified("3", "A"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "A");
        assert_eq!(ids(&groups[0].candidates), vec!["1", "3"]);
        assert_eq!(groups[1].label, "B");
        assert_eq!(ids(&groups[1].candidates), vec!["2"]);
    }

    #[test]
    fn encounter_order_is_not_alphabetical() {
        let groups =
            group_by_classification(vec![classified("1", "Zeta"), classified("2", "Alpha")]);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn unclassified_candidates_share_the_empty_group() {
        let groups = group_by_classification(vec![
            CandidateEntity::new("1", "one"),
            classified("2", "A"),
            CandidateEntity::new("3", "three"),
        ]);
        assert_eq!(groups[0].label, "");
        assert_eq!(ids(&groups[0].candidates), vec!["1", "3"]);
    }

    #[test]
    fn groups_and_users_stay_flat() {
        let set = CandidateSet::for_kind(TargetKind::Group, vec![classified("g-1", "X")]);
        assert!(matches!(set, CandidateSet::Flat(_)));
        assert!(set.contains("g-1"));
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn pager_walks_and_restarts() {
        let catalog = MemoryStore::new().with_candidates(
            TargetKind::User,
            (1..=5).map(|n| CandidateEntity::new(n.to_string(), format!("user {n}"))),
        );
        let mut pager = CandidatePager::new(&catalog, TargetKind::User, 2);

        assert_eq!(ids(&pager.next_page().await.unwrap().unwrap()), vec!["1", "2"]);
        assert_eq!(ids(&pager.next_page().await.unwrap().unwrap()), vec!["3", "4"]);
        assert_eq!(ids(&pager.next_page().await.unwrap().unwrap()), vec!["5"]);
        assert!(pager.is_exhausted());
        assert_eq!(pager.next_page().await.unwrap(), None);

        pager.restart();
        assert_eq!(ids(&pager.next_page().await.unwrap().unwrap()), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn enumerate_groups_policies_across_pages() {
        let catalog = MemoryStore::new().with_candidates(
            TargetKind::Policy,
            vec![classified("1", "A"), classified("2", "B"), classified("3", "A")],
        );
        let set = enumerate_candidates(&catalog, TargetKind::Policy, 1)
            .await
            .unwrap();
        let CandidateSet::Grouped(groups) = set else {
            panic!("policies must be grouped");
        };
        assert_eq!(groups[0].label, "A");
        assert_eq!(ids(&groups[0].candidates), vec!["1", "3"]);
        assert_eq!(ids(&groups[1].candidates), vec!["2"]);
    }
}
