//! Conductor Core - Headless Chat Orchestration for the Dream11 Support Bot
//!
//! This crate holds the conversation model and the send pipeline, completely
//! independent of any UI framework. It drives the terminal widget, and can
//! run headless for tests and scripting.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI Surface                          │
//! │        header · message list · input row (ratatui)       │
//! │                           │                              │
//! │                    SurfaceEvent (up)                     │
//! │                  ConductorMessage (down)                 │
//! └───────────────────────────┼──────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────┐
//! │                    CONDUCTOR CORE                        │
//! │  ┌────────────────────────┴───────────────────────────┐  │
//! │  │                    Conductor                       │  │
//! │  │   ┌──────────┐    ┌──────────┐    ┌─────────────┐  │  │
//! │  │   │ Session  │    │  Config  │    │ ChatBackend │  │  │
//! │  │   └──────────┘    └──────────┘    └──────┬──────┘  │  │
//! │  └──────────────────────────────────────────┼─────────┘  │
//! └─────────────────────────────────────────────┼────────────┘
//!                                               │ POST /api/chat
//!                                               ▼
//!                                       support backend
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns the session and runs the send pipeline
//! - [`ConductorMessage`]: Messages sent from Conductor to the surface
//! - [`SurfaceEvent`]: Events sent from the surface to Conductor
//! - [`Session`]: Ordered message list plus the reply-pending flag
//! - [`ChatBackend`]: Injectable transport, [`HttpChatBackend`] by default
//!
//! # Quick Start
//!
//! ```ignore
//! use dream11_conductor::{Conductor, ConductorConfig, HttpChatBackend, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = dream11_conductor::load_config()?;
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let backend = HttpChatBackend::new(config.api.clone())?;
//!     let mut conductor = Conductor::new(backend, ConductorConfig::from_api(&config.api), tx);
//!     conductor.start().await?;
//!
//!     conductor.handle_event(SurfaceEvent::user_message("Hello")).await?;
//!     conductor.wait_for_reply().await;
//!
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message to UI
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Chat backend abstraction and the HTTP transport
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: Layered configuration (CLI, env, TOML, defaults)
//! - [`events`]: Events from the surface to Conductor
//! - [`messages`]: Messages from Conductor to the surface
//! - [`session`]: Conversation session state
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod events;
pub mod messages;
pub mod session;

// Re-exports for convenience
pub use backend::{extract_reply, BackendError, ChatBackend, ChatRequest, HttpChatBackend};
pub use conductor::{resolve_reply, Conductor, ConductorConfig, ReplyOutcome};
pub use events::SurfaceEvent;
pub use messages::{
    ChatMessage, ConductorMessage, ConductorState, EventId, NotifyLevel, Origin, SessionId,
    CONNECTION_ERROR_REPLY, FALLBACK_REPLY, GREETING,
};
pub use session::{Session, SessionError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, ApiConfig,
    ConfigError, ConfigOverrides, ConfigSource, SupportBotConfig,
};
