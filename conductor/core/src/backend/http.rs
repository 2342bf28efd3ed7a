//! HTTP Backend Implementation
//!
//! Talks to the support backend over plain JSON-over-HTTP.
//!
//! # Endpoints
//!
//! - `POST /api/chat` - body `{"message": "..."}`, answers with a JSON object
//!   holding the reply in `reply`, `message` or `response`
//! - `GET /api/health` - any 2xx means the backend is up
//!
//! Paths are configurable through [`ApiConfig`].

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{BackendError, ChatBackend, ChatRequest};
use crate::config::ApiConfig;

/// Health checks never wait longer than this, even without a request timeout
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP chat backend
#[derive(Clone)]
pub struct HttpChatBackend {
    /// Endpoint settings
    api: ApiConfig,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for the given endpoint settings
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the HTTP client cannot be built.
    pub fn new(api: ApiConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = api.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self { api, http_client })
    }

    /// Create a backend for the local development server
    ///
    /// # Errors
    ///
    /// See [`HttpChatBackend::new`].
    pub fn local() -> Result<Self, BackendError> {
        Self::new(ApiConfig::default())
    }

    /// POST the request and decode the JSON body
    async fn post_chat(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> Result<serde_json::Value, BackendError> {
        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Endpoint settings in use
    #[must_use]
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    fn endpoint(&self) -> String {
        self.api.chat_url()
    }

    async fn health_check(&self) -> bool {
        let url = self.api.health_url();
        match self
            .http_client
            .get(&url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Health check failed");
                false
            }
        }
    }

    async fn send_message(
        &self,
        request: &ChatRequest,
    ) -> Result<serde_json::Value, BackendError> {
        let url = self.api.chat_url();
        tracing::debug!(url = %url, chars = request.message.chars().count(), "Sending chat request");

        let result = self.post_chat(&url, request).await;

        if let Err(ref e) = result {
            tracing::error!(url = %url, error = %e, "Chat request failed");
        }
        result
    }
}
