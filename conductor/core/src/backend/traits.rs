//! Chat Backend Traits
//!
//! Trait definitions for the support backend. The Conductor only talks to a
//! [`ChatBackend`], so tests and headless callers can swap in a mock
//! transport without changing core logic.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Response fields that may carry the reply text, highest precedence first
pub const REPLY_FIELDS: [&str; 3] = ["reply", "message", "response"];

/// Errors from a chat backend
///
/// The Conductor collapses all of these into one user-facing message; the
/// variants only exist for logs and tests.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status
    #[error("backend returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not JSON
    #[error("could not decode response body: {0}")]
    Decode(String),
}

/// Body of a chat request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The trimmed user input
    pub message: String,
    /// Session to attach the message to (omitted from the body when `None`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Create a request carrying only the message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
        }
    }

    /// Attach a session ID
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Pull the reply text out of a response body
///
/// Returns the first of `reply`, `message`, `response` that holds a non-empty
/// string. Other values (empty strings, numbers, null) fall through to the
/// next field.
#[must_use]
pub fn extract_reply(body: &serde_json::Value) -> Option<String> {
    REPLY_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(serde_json::Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

/// Chat backend trait
///
/// Implement this to point the Conductor at a different transport.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name (for logs)
    fn name(&self) -> &str;

    /// Where requests go, as shown to the user
    fn endpoint(&self) -> String {
        self.name().to_string()
    }

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send one message and return the decoded response body
    async fn send_message(&self, request: &ChatRequest)
        -> Result<serde_json::Value, BackendError>;
}
