//! Support Backend Integration
//!
//! Access to the reply-generating backend through a common trait.
//!
//! # Available Backends
//!
//! - **HTTP**: `POST <base>/api/chat` with a JSON body (default)
//!
//! # Usage
//!
//! ```ignore
//! use dream11_conductor::backend::{ChatBackend, ChatRequest, HttpChatBackend};
//!
//! let backend = HttpChatBackend::new(config.api.clone())?;
//! let body = backend.send_message(&ChatRequest::new("Hello")).await?;
//! ```

mod http;
mod traits;

pub use http::HttpChatBackend;
pub use traits::{extract_reply, BackendError, ChatBackend, ChatRequest, REPLY_FIELDS};
