//! Transport client for the tracker REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `types` holds the envelope, raw request/reply and the [`Transport`] seam,
//! `http` is the reqwest implementation, and `resource` exposes the CRUD
//! groups. [`ApiClient`] ties them together and is what stores depend on.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures are logged here and returned unchanged. No retry, no
//! backoff. Logical failures (`success:false`) are not errors at this layer.

pub mod http;
pub mod resource;
pub mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use http::HttpTransport;
pub use resource::{Blades, Razors, Resource, ResourceApi, UsageRecords};
pub use types::{ApiError, ApiReply, ApiRequest, Envelope, Transport, decode_reply};

use crate::config::ClientConfig;
use crate::model::{DashboardData, HealthStatus, Statistics};

/// Versioned base path every resource lives under.
pub const API_BASE_PATH: &str = "/api/v1";

/// Health check path; served from the server root, outside [`API_BASE_PATH`].
pub const HEALTH_PATH: &str = "/health";

pub(crate) fn versioned_path(segment: &str) -> String {
    format!("{API_BASE_PATH}/{segment}")
}

/// Typed client over a shared [`Transport`]. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a client backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    #[must_use]
    pub fn resource<R: Resource>(&self) -> ResourceApi<R> {
        ResourceApi::new(self.clone())
    }

    #[must_use]
    pub fn razors(&self) -> ResourceApi<Razors> {
        self.resource()
    }

    #[must_use]
    pub fn blades(&self) -> ResourceApi<Blades> {
        self.resource()
    }

    #[must_use]
    pub fn usage_records(&self) -> ResourceApi<UsageRecords> {
        self.resource()
    }

    /// `GET /dashboard`
    ///
    /// # Errors
    ///
    /// Returns any transport error.
    pub async fn dashboard(&self) -> Result<Envelope<DashboardData>, ApiError> {
        self.call(ApiRequest::get(versioned_path("dashboard"))).await
    }

    /// `GET /statistics`
    ///
    /// # Errors
    ///
    /// Returns any transport error.
    pub async fn statistics(&self) -> Result<Envelope<Statistics>, ApiError> {
        self.call(ApiRequest::get(versioned_path("statistics"))).await
    }

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns any transport error.
    pub async fn health(&self) -> Result<Envelope<HealthStatus>, ApiError> {
        self.call(ApiRequest::get(HEALTH_PATH)).await
    }

    pub(crate) async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<T>, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let reply = self.transport.execute(request).await.inspect_err(|error| {
            tracing::error!(%method, %path, %error, "API request failed");
        })?;
        let status = reply.status;
        tracing::debug!(%method, %path, status, "API reply");

        let envelope = decode_reply::<T>(reply).inspect_err(|error| {
            tracing::error!(%method, %path, status, %error, "API reply rejected");
        })?;
        if !envelope.success {
            tracing::warn!(%method, %path, status, reason = %envelope.failure_reason(), "backend reported failure");
        }
        Ok(envelope)
    }
}
