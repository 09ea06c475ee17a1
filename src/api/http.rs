//! reqwest-backed [`Transport`].
//!
//! One shared `reqwest::Client` with a fixed per-request timeout. Failures
//! are returned as-is; this layer never retries.

use async_trait::async_trait;

use super::types::{ApiError, ApiReply, ApiRequest, Transport};
use crate::config::{ClientConfig, Timeouts};

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    timeouts: Timeouts,
}

impl HttpTransport {
    /// Build a transport from config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), timeouts: config.timeouts })
    }

    fn map_error(&self, err: &reqwest::Error) -> ApiError {
        self.classify(err.is_timeout(), err.is_connect(), err.to_string())
    }

    /// A timeout names the budget that ran out: connect or whole request.
    fn classify(&self, timed_out: bool, connecting: bool, message: String) -> ApiError {
        match (timed_out, connecting) {
            (true, true) => ApiError::Timeout(self.timeouts.connect_secs),
            (true, false) => ApiError::Timeout(self.timeouts.request_secs),
            (false, _) => ApiError::Request(message),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiReply, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(&e))?;
        Ok(ApiReply { status, body })
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
