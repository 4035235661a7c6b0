//! Create and edit sessions over a single binding.
//!
//! A [`BindingEditor`] owns the in-memory [`BindingDraft`] for its whole
//! lifetime. Remote results (order lookup, candidate lists) are written
//! into the draft only once the awaited fetch has resolved, so dropping an
//! editor or one of its futures mid-flight leaves nothing half-applied.
//! The requests themselves are not interrupted.
//!
//! This includes the save itself: a `submit` dropped while the create is in
//! flight may still store the binding, but the draft never learns its id.
//! Submitting that draft again creates a second binding.

use std::sync::Arc;

use binding_model::{BindingPayload, BindingRecord, Field, TargetKind, ValidationErrors};
use binding_store::{BindingStore, CandidateCatalog, StoreError};
use tracing::{debug, info, warn};

use crate::candidates::{load_section, CandidateSet};
use crate::config::ResolverConfig;
use crate::error::{BindingError, Section};
use crate::resolver::{ResolverMode, TargetResolver};

/// The binding as the user is editing it.
///
/// The parent and id are fixed for the session; everything else is a
/// direct user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDraft {
    id: Option<String>,
    parent: String,
    /// Order held by the store, for a binding that has been saved.
    stored_order: Option<i64>,
    pub resolver: TargetResolver,
    /// `None` for a new binding until an order has been assigned. Clearing
    /// it on a stored binding falls back to the stored order.
    pub order: Option<i64>,
    pub enabled: bool,
    pub negate: bool,
    pub timeout_seconds: i64,
}

impl BindingDraft {
    /// A new, unsaved binding of `parent` with the configured defaults.
    pub fn new(parent: impl Into<String>, config: &ResolverConfig) -> Self {
        Self {
            id: None,
            parent: parent.into(),
            stored_order: None,
            resolver: TargetResolver::new(config.mode()),
            order: None,
            enabled: config.defaults.enabled,
            negate: config.defaults.negate,
            timeout_seconds: i64::from(config.defaults.timeout_seconds),
        }
    }

    /// A draft of a binding loaded from the store.
    pub fn from_payload(payload: BindingPayload, mode: ResolverMode) -> Self {
        let resolver = TargetResolver::from_payload(&payload, mode);
        Self {
            id: payload.pk,
            parent: payload.parent.unwrap_or_default(),
            stored_order: Some(payload.order),
            resolver,
            order: Some(payload.order),
            enabled: payload.enabled,
            negate: payload.negate,
            timeout_seconds: payload.timeout_seconds,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Whether the binding has never been stored.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Build the wire payload for submission at `order`.
    ///
    /// All violations are reported together. A missing selection is
    /// reported once, naming the active kind.
    pub fn to_payload(&self, order: i64) -> Result<BindingPayload, ValidationErrors> {
        let mut payload = BindingPayload {
            pk: self.id.clone(),
            parent: Some(self.parent.clone()),
            policy: None,
            group: None,
            user: None,
            order,
            enabled: self.enabled,
            negate: self.negate,
            timeout_seconds: self.timeout_seconds,
        };

        let mut errors = ValidationErrors::new();
        if let Err(target_errors) = self.resolver.project(&mut payload) {
            errors.extend(target_errors);
        }
        if let Err(payload_errors) = payload.validate() {
            let target_reported = errors.has(Field::Target);
            errors.extend(
                payload_errors
                    .into_iter()
                    .filter(|e| !(target_reported && e.field == Field::Target)),
            );
        }

        errors.into_result().map(|()| payload)
    }

    /// Check every submission rule without building anything.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.to_payload(self.known_order().unwrap_or_default()).map(|_| ())
    }

    /// The order to submit without asking the store, if there is one.
    fn known_order(&self) -> Option<i64> {
        self.order.or(self.stored_order)
    }
}

/// Candidate lists per target kind, each with its own outcome.
///
/// Group and user sections are `None` in policy-only mode.
#[derive(Debug)]
pub struct CandidateSections {
    pub policy: Result<CandidateSet, BindingError>,
    pub group: Option<Result<CandidateSet, BindingError>>,
    pub user: Option<Result<CandidateSet, BindingError>>,
}

impl CandidateSections {
    pub fn section(&self, kind: TargetKind) -> Option<&Result<CandidateSet, BindingError>> {
        match kind {
            TargetKind::Policy => Some(&self.policy),
            TargetKind::Group => self.group.as_ref(),
            TargetKind::User => self.user.as_ref(),
        }
    }
}

/// Outcome of [`BindingEditor::prepare`].
#[derive(Debug)]
pub struct Prepared {
    pub order: Result<i64, BindingError>,
    pub candidates: CandidateSections,
}

/// One create or edit session over a binding.
pub struct BindingEditor<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    catalog: Arc<C>,
    config: ResolverConfig,
    draft: BindingDraft,
}

impl<S, C> BindingEditor<S, C>
where
    S: BindingStore + ?Sized,
    C: CandidateCatalog + ?Sized,
{
    /// Start creating a binding of `parent`.
    pub fn create(
        store: Arc<S>,
        catalog: Arc<C>,
        config: ResolverConfig,
        parent: impl Into<String>,
    ) -> Self {
        let draft = BindingDraft::new(parent, &config);
        debug!(parent = draft.parent(), mode = ?config.mode(), "creating binding");
        Self {
            store,
            catalog,
            config,
            draft,
        }
    }

    /// Load binding `id` for editing.
    pub async fn edit(
        store: Arc<S>,
        catalog: Arc<C>,
        config: ResolverConfig,
        id: &str,
    ) -> Result<Self, BindingError> {
        let payload = store.fetch_binding(id).await.map_err(|source| {
            warn!(binding = id, error = %source, "could not load binding");
            BindingError::fetch(Section::Binding)(source)
        })?;
        let draft = BindingDraft::from_payload(payload, config.mode());
        debug!(binding = id, parent = draft.parent(), "editing binding");
        Ok(Self {
            store,
            catalog,
            config,
            draft,
        })
    }

    pub fn draft(&self) -> &BindingDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut BindingDraft {
        &mut self.draft
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Fetch the candidate list of every selectable kind.
    ///
    /// Kinds are fetched concurrently and fail independently.
    pub async fn load_candidates(&self) -> CandidateSections {
        let catalog = self.catalog.as_ref();
        let page_size = self.config.resolver.page_size;

        if self.draft.resolver.mode() == ResolverMode::PolicyOnly {
            return CandidateSections {
                policy: load_section(catalog, TargetKind::Policy, page_size).await,
                group: None,
                user: None,
            };
        }

        let (policy, group, user) = tokio::join!(
            load_section(catalog, TargetKind::Policy, page_size),
            load_section(catalog, TargetKind::Group, page_size),
            load_section(catalog, TargetKind::User, page_size),
        );
        CandidateSections {
            policy,
            group: Some(group),
            user: Some(user),
        }
    }

    /// Fill in the draft's order if it has none, and return it.
    pub async fn assign_order(&mut self) -> Result<i64, BindingError> {
        let order = self.lookup_order().await?;
        self.draft.order = Some(order);
        Ok(order)
    }

    /// Run the order lookup and the candidate fetches concurrently.
    ///
    /// A successful order lookup is written into the draft; candidate
    /// results are handed back to the caller.
    pub async fn prepare(&mut self) -> Prepared {
        let (order, candidates) = tokio::join!(self.lookup_order(), self.load_candidates());
        if let Ok(order) = &order {
            self.draft.order = Some(*order);
        }
        Prepared { order, candidates }
    }

    /// Validate, assign an order if needed, and create or update the binding.
    ///
    /// Nothing is sent when the draft is invalid. On any failure the draft
    /// is kept as-is so the caller can fix it or retry. After a successful
    /// create the editor continues as an edit of the stored binding.
    pub async fn submit(&mut self) -> Result<BindingRecord, BindingError> {
        self.draft.validate()?;

        let order = match self.draft.known_order() {
            Some(order) => order,
            None => self.assign_order().await?,
        };
        let payload = self.draft.to_payload(order)?;

        let result = match self.draft.id() {
            Some(id) => self.store.update_binding(id, payload).await,
            None => self.store.create_binding(payload).await,
        };
        let saved = result.map_err(|source| {
            warn!(parent = self.draft.parent(), error = %source, "binding submission failed");
            BindingError::Submission(source)
        })?;

        let record = BindingRecord::try_from(saved).map_err(|errors| {
            BindingError::Submission(StoreError::Backend(format!(
                "store returned an invalid binding: {errors}"
            )))
        })?;
        info!(
            binding = record.id.as_deref().unwrap_or_default(),
            parent = %record.parent,
            order = record.order,
            "saved binding"
        );

        self.draft.id = record.id.clone();
        self.draft.stored_order = Some(record.order);
        self.draft.order = Some(record.order);
        Ok(record)
    }

    /// Discard the session without saving.
    pub fn cancel(self) {
        debug!(
            binding = self.draft.id().unwrap_or("<new>"),
            parent = self.draft.parent(),
            "binding edit cancelled"
        );
    }

    async fn lookup_order(&self) -> Result<i64, BindingError> {
        let known = self.draft.known_order();
        crate::order::assign_order(self.store.as_ref(), &self.draft.parent, known)
            .await
            .map_err(|source| {
                warn!(parent = %self.draft.parent, error = %source, "order lookup failed");
                BindingError::fetch(Section::Siblings)(source)
            })
    }
}
