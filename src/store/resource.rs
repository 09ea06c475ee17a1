//! Generic CRUD store, instantiated once per resource.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use tokio::sync::watch;

use super::{LoadingGuard, StoreError, StoreState};
use crate::api::{ApiError, Blades, Envelope, Razors, Resource, ResourceApi, UsageRecords};
use crate::model::{EntityId, Identified, Page, PageParams};

pub type RazorStore = ResourceStore<Razors>;
pub type BladeStore = ResourceStore<Blades>;
pub type UsageRecordStore = ResourceStore<UsageRecords>;

/// Cache of the last known list and selected item for one resource.
pub struct ResourceStore<R: Resource> {
    api: ResourceApi<R>,
    state: watch::Sender<StoreState<R::Entity>>,
}

impl<R: Resource> ResourceStore<R> {
    #[must_use]
    pub fn new(api: ResourceApi<R>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self { api, state }
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreState<R::Entity> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change, busy flag included.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState<R::Entity>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn items(&self) -> Vec<R::Entity> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<R::Entity> {
        self.state.borrow().current.clone()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.state.borrow().total
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Drop the selected entity, e.g. when a detail view closes.
    pub fn clear_current(&self) {
        self.state.send_modify(|s| s.current = None);
    }

    /// Fetch a page and replace `items`/`total` on success.
    ///
    /// A `success:false` reply leaves the cache untouched, records the reason
    /// in `error` and is returned as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn fetch_list(&self, params: Option<PageParams>) -> Result<Envelope<Page<R::Entity>>, ApiError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.api.get_list(params).await.inspect_err(|error| {
            tracing::error!(resource = R::NAME, %error, "list fetch failed");
        })?;

        match (&envelope.data, envelope.success) {
            (Some(page), true) => self.state.send_modify(|s| {
                s.items.clone_from(&page.items);
                s.total = page.total;
                s.error = None;
            }),
            (_, false) => self.record_failure(&envelope),
            (None, true) => {}
        }
        Ok(envelope)
    }

    /// Fetch one entity and replace `current` on success.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn fetch_by_id(&self, id: EntityId) -> Result<Envelope<R::Entity>, ApiError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.api.get_by_id(id).await.inspect_err(|error| {
            tracing::error!(resource = R::NAME, id, %error, "detail fetch failed");
        })?;

        match (&envelope.data, envelope.success) {
            (Some(entity), true) => self.state.send_modify(|s| {
                s.current = Some(entity.clone());
                s.error = None;
            }),
            (_, false) => self.record_failure(&envelope),
            (None, true) => {}
        }
        Ok(envelope)
    }

    /// Create an entity, then re-fetch the default list page.
    ///
    /// # Errors
    ///
    /// [`StoreError::Rejected`] when the backend reports failure; otherwise the
    /// transport error.
    pub async fn create(&self, payload: &R::Create) -> Result<Envelope<R::Entity>, StoreError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.api.create(payload).await.inspect_err(|error| {
            tracing::error!(resource = R::NAME, %error, "create failed");
        })?;
        let envelope = self.after_mutation("create", envelope).await?;
        if let Some(entity) = &envelope.data {
            tracing::info!(resource = R::NAME, id = entity.id(), "created");
        }
        Ok(envelope)
    }

    /// Update an entity, then re-fetch the default list page.
    ///
    /// # Errors
    ///
    /// [`StoreError::Rejected`] when the backend reports failure; otherwise the
    /// transport error.
    pub async fn update(&self, id: EntityId, patch: &R::Update) -> Result<Envelope<R::Entity>, StoreError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.api.update(id, patch).await.inspect_err(|error| {
            tracing::error!(resource = R::NAME, id, %error, "update failed");
        })?;
        self.after_mutation("update", envelope).await
    }

    /// Delete an entity, then re-fetch the default list page.
    ///
    /// # Errors
    ///
    /// [`StoreError::Rejected`] when the backend reports failure; otherwise the
    /// transport error.
    pub async fn delete(&self, id: EntityId) -> Result<Envelope<()>, StoreError> {
        let _busy = LoadingGuard::begin(&self.state);
        let envelope = self.api.delete(id).await.inspect_err(|error| {
            tracing::error!(resource = R::NAME, id, %error, "delete failed");
        })?;
        self.after_mutation("delete", envelope).await
    }

    async fn after_mutation<T>(&self, operation: &'static str, envelope: Envelope<T>) -> Result<Envelope<T>, StoreError> {
        if !envelope.success {
            tracing::warn!(resource = R::NAME, operation, reason = %envelope.failure_reason(), "mutation rejected");
            return Err(StoreError::rejected(&envelope));
        }
        // The mutation is committed server-side; a failed refresh only leaves the cache stale.
        if let Err(error) = self.fetch_list(None).await {
            tracing::warn!(resource = R::NAME, operation, %error, "refresh after mutation failed");
        }
        Ok(envelope)
    }

    fn record_failure<T>(&self, envelope: &Envelope<T>) {
        let reason = envelope.failure_reason();
        tracing::warn!(resource = R::NAME, %reason, "fetch reported failure; keeping cached state");
        self.state.send_modify(|s| s.error = Some(reason));
    }
}
