//! Conductor - The Orchestration Core
//!
//! The Conductor owns the chat session and runs the send pipeline:
//! user text in, one request out, one bot message back.
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It doesn't know whether it's talking to a
//! terminal, a test harness or something else. It communicates through:
//! - `ConductorMessage`: Commands sent TO the UI surface
//! - `SurfaceEvent`: Events received FROM the UI surface
//!
//! # Send Pipeline
//!
//! ```text
//! UserMessage ──trim──► empty? ──yes──► ignored
//!                          │
//!                          no ──► reply pending? ──yes──► rejected (logged)
//!                                        │
//!                                        no
//!                                        ▼
//!                 append user message, mark pending, spawn request
//!                                        │
//!                    poll_reply() / wait_for_reply()
//!                                        ▼
//!         append bot message (reply | fallback | error), clear pending
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::backend::{extract_reply, BackendError, ChatBackend, ChatRequest};
use crate::config::ApiConfig;
use crate::events::SurfaceEvent;
use crate::messages::{
    ChatMessage, ConductorMessage, ConductorState, NotifyLevel, SessionId, CONNECTION_ERROR_REPLY,
    FALLBACK_REPLY,
};
use crate::session::Session;

/// Outcome of one chat request
pub type ReplyOutcome = Result<serde_json::Value, BackendError>;

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Attach the session ID to every chat request
    pub send_session_id: bool,
    /// Run the backend health check in [`Conductor::start`]
    pub health_check_on_start: bool,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            send_session_id: false,
            health_check_on_start: true,
        }
    }
}

impl ConductorConfig {
    /// Derive conductor settings from the API configuration
    #[must_use]
    pub fn from_api(api: &ApiConfig) -> Self {
        Self {
            send_session_id: api.send_session_id,
            ..Self::default()
        }
    }
}

/// Map a request outcome to the text the bot shows
///
/// Success uses the first present of `reply`, `message`, `response`, else
/// [`FALLBACK_REPLY`]. Every failure becomes [`CONNECTION_ERROR_REPLY`]; the
/// error detail never reaches the conversation.
#[must_use]
pub fn resolve_reply(outcome: &ReplyOutcome) -> String {
    match outcome {
        Ok(body) => extract_reply(body).unwrap_or_else(|| FALLBACK_REPLY.to_string()),
        Err(_) => CONNECTION_ERROR_REPLY.to_string(),
    }
}

/// The Conductor - headless orchestration core
pub struct Conductor<B: ChatBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Chat backend
    backend: Arc<B>,
    /// Current session
    session: Session,
    /// Current operational state
    state: ConductorState,
    /// Result of the last health check
    backend_online: Option<bool>,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Outcome of the in-flight request
    pending_reply: Option<oneshot::Receiver<ReplyOutcome>>,
    /// Last size the surface reported
    surface_size: Option<(u32, u32)>,
    /// Whether the user is typing, per the surface
    user_typing: bool,
}

impl<B: ChatBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            session: Session::new(),
            state: ConductorState::Initializing,
            backend_online: None,
            tx,
            pending_reply: None,
            surface_size: None,
            user_typing: false,
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &SessionId {
        &self.session.id
    }

    /// Get current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// The conversation so far
    pub fn transcript(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    /// Whether a reply is outstanding
    pub fn is_reply_pending(&self) -> bool {
        self.session.is_reply_pending()
    }

    /// Last surface size reported through [`SurfaceEvent::Resized`]
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }

    /// Whether the surface reports the user as typing
    pub fn is_user_typing(&self) -> bool {
        self.user_typing
    }

    /// Result of the last health check (`None` until [`Conductor::start`] ran it)
    pub fn backend_online(&self) -> Option<bool> {
        self.backend_online
    }

    /// Start the Conductor
    ///
    /// Checks the backend once and reports the result. An unreachable
    /// backend is a warning: the first message will simply fail and show the
    /// connection error.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.set_state(ConductorState::Initializing).await;

        if self.config.health_check_on_start {
            let online = self.backend.health_check().await;
            self.backend_online = Some(online);
            if online {
                tracing::info!(backend = self.backend.name(), "Support backend is reachable");
                self.notify(NotifyLevel::Info, "Connected to support").await;
            } else {
                tracing::warn!(
                    backend = self.backend.name(),
                    "Support backend health check failed"
                );
                self.notify(NotifyLevel::Warning, "Support backend is not reachable yet")
                    .await;
            }
            self.send(ConductorMessage::BackendStatus { online }).await;
        }

        self.send(ConductorMessage::SessionInfo {
            session_id: self.session.id.clone(),
            endpoint: self.backend.endpoint(),
        })
        .await;

        self.set_state(ConductorState::Ready).await;
        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        if let Some(event_id) = event.event_id() {
            tracing::debug!(event_id = %event_id.0, "Surface event");
        }

        match event {
            SurfaceEvent::Connected { .. } => {
                tracing::debug!("Surface connected");

                // Replay everything so a late surface starts in sync
                self.send(ConductorMessage::State { state: self.state })
                    .await;
                if let Some(online) = self.backend_online {
                    self.send(ConductorMessage::BackendStatus { online }).await;
                }
                for message in self.session.messages().to_vec() {
                    self.send(ConductorMessage::Message { message }).await;
                }
            }

            SurfaceEvent::Resized { width, height, .. } => {
                tracing::trace!(width, height, "Surface resized");
                self.surface_size = Some((width, height));
            }

            SurfaceEvent::UserMessage { content, .. } => {
                self.handle_user_message(&content).await?;
            }

            SurfaceEvent::UserTyping { typing } => {
                tracing::trace!(typing, "User typing");
                self.user_typing = typing;
            }

            SurfaceEvent::QuitRequested { .. } => {
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Run the send operation for one submission
    async fn handle_user_message(&mut self, content: &str) -> anyhow::Result<()> {
        let text = content.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty submission");
            return Ok(());
        }
        if self.session.is_reply_pending() {
            tracing::warn!("Rejected submission while a reply is pending");
            return Ok(());
        }

        self.user_typing = false;
        let message = ChatMessage::user(text);
        self.session.push(message.clone());
        self.send(ConductorMessage::Message { message }).await;

        self.session.begin_reply()?;
        self.set_state(ConductorState::AwaitingReply).await;

        let mut request = ChatRequest::new(text);
        if self.config.send_session_id {
            request = request.with_session_id(self.session.id.as_str());
        }

        let backend = Arc::clone(&self.backend);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = backend.send_message(&request).await;
            // Receiver gone means the conductor shut down
            let _ = reply_tx.send(outcome);
        });
        self.pending_reply = Some(reply_rx);

        Ok(())
    }

    /// Poll for the outstanding reply
    ///
    /// Call this regularly. Returns true if a reply was applied.
    pub async fn poll_reply(&mut self) -> bool {
        let outcome = {
            let Some(rx) = self.pending_reply.as_mut() else {
                return false;
            };
            match rx.try_recv() {
                Ok(outcome) => outcome,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => Err(request_task_lost()),
            }
        };

        self.pending_reply = None;
        self.complete_reply(&outcome).await;
        true
    }

    /// Wait until the outstanding reply arrives and apply it
    ///
    /// Returns false if nothing was outstanding.
    pub async fn wait_for_reply(&mut self) -> bool {
        let Some(rx) = self.pending_reply.take() else {
            return false;
        };
        let outcome = rx.await.unwrap_or_else(|_| Err(request_task_lost()));
        self.complete_reply(&outcome).await;
        true
    }

    /// Append the bot message for an outcome and clear the pending flag
    async fn complete_reply(&mut self, outcome: &ReplyOutcome) {
        if let Err(ref e) = outcome {
            tracing::debug!(error = %e, "Reply failed, showing connection error");
        }

        let message = ChatMessage::bot(resolve_reply(outcome));
        match self.session.finish_reply(message.clone()) {
            Ok(()) => self.send(ConductorMessage::Message { message }).await,
            Err(e) => tracing::warn!(error = %e, "Dropping reply"),
        }

        if self.state == ConductorState::AwaitingReply {
            self.set_state(ConductorState::Ready).await;
        }
    }

    /// Shut down the Conductor
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.set_state(ConductorState::ShuttingDown).await;
        self.pending_reply = None;
        if self.session.abandon_reply() {
            tracing::debug!("Abandoned the outstanding reply on shutdown");
        }

        self.send(ConductorMessage::Quit {
            message: Some("Goodbye!".to_string()),
        })
        .await;

        Ok(())
    }

    /// Set state and notify UI
    async fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ConductorMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

fn request_task_lost() -> BackendError {
    BackendError::Transport("request task ended without a result".to_string())
}
