//! Client library for a personal shaving-equipment tracker.
//!
//! SYSTEM CONTEXT
//! ==============
//! The tracker backend is a REST service that owns all persistent state:
//! razors, blades, per-shave usage records and derived statistics. This crate
//! is the client side of it.
//!
//! - [`api`]: typed transport over the backend, one CRUD group per resource.
//! - [`store`]: observable per-resource caches built on the transport.
//! - [`context`]: the explicit object that owns the client and the stores.
//! - [`model`]: entity and request types shared by all of the above.
//! - [`config`]: environment-driven client configuration.

pub mod api;
pub mod config;
pub mod context;
pub mod model;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiError, Envelope};
pub use config::ClientConfig;
pub use context::AppContext;
pub use store::StoreError;
