//! Client-side resource stores.
//!
//! DESIGN
//! ======
//! Each store caches the last response for one resource and publishes every
//! change through a `tokio::sync::watch` channel, so views can either take a
//! snapshot or subscribe. Caches are replaced wholesale after every fetch and
//! re-fetched after every mutation; nothing is patched in place.
//!
//! The busy flag is driven by [`LoadingGuard`], which clears it on drop. That
//! covers success, logical failure, error returns and abandoned futures alike.
//! Overlapping calls on one store are counted so the flag only drops when the
//! last one finishes; their responses still land in arrival order.

pub mod resource;
pub mod statistics;

use tokio::sync::watch;

use crate::api::{ApiError, Envelope};

pub use resource::{BladeStore, RazorStore, ResourceStore, UsageRecordStore};
pub use statistics::{StatisticsState, StatisticsStore};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The transport call failed; the original error is preserved.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The backend answered a mutation with `success:false`.
    #[error("{message}: {reason}")]
    Rejected { message: String, reason: String },
}

impl StoreError {
    pub(crate) fn rejected<T>(envelope: &Envelope<T>) -> Self {
        Self::Rejected { message: envelope.message.clone(), reason: envelope.failure_reason() }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Observable state of a CRUD resource store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<T> {
    /// Items from the last successful list fetch.
    pub items: Vec<T>,
    /// Entity from the last successful detail fetch.
    pub current: Option<T>,
    /// `total` from the last successful list fetch.
    pub total: u64,
    pub loading: bool,
    /// Reason from the last `success:false` fetch; cleared by the next success.
    pub error: Option<String>,
    in_flight: usize,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), current: None, total: 0, loading: false, error: None, in_flight: 0 }
    }
}

/// State that carries a busy flag driven by [`LoadingGuard`].
pub(crate) trait BusyState {
    fn in_flight(&mut self) -> &mut usize;
    fn set_loading(&mut self, loading: bool);
}

impl<T> BusyState for StoreState<T> {
    fn in_flight(&mut self) -> &mut usize {
        &mut self.in_flight
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

/// Marks a store busy for as long as it lives.
pub(crate) struct LoadingGuard<'a, S: BusyState> {
    state: &'a watch::Sender<S>,
}

impl<'a, S: BusyState> LoadingGuard<'a, S> {
    pub(crate) fn begin(state: &'a watch::Sender<S>) -> Self {
        state.send_modify(|s| {
            *s.in_flight() += 1;
            s.set_loading(true);
        });
        Self { state }
    }
}

impl<S: BusyState> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            let in_flight = s.in_flight();
            *in_flight = in_flight.saturating_sub(1);
            let busy = *in_flight > 0;
            s.set_loading(busy);
        });
    }
}
