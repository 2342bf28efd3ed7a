//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network between them) and
//! provides a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use dream11_conductor::{
    ChatBackend, Conductor, ConductorConfig, ConductorMessage, ConductorState, HttpChatBackend,
    SupportBotConfig, SurfaceEvent,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: ChatBackend + 'static = HttpChatBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<HttpChatBackend> {
    /// Create a client talking HTTP to the configured backend
    pub fn from_config(config: &SupportBotConfig) -> anyhow::Result<Self> {
        let backend = HttpChatBackend::new(config.api.clone())?;
        Ok(Self::new(backend, ConductorConfig::from_api(&config.api)))
    }
}

impl<B: ChatBackend + 'static> ConductorClient<B> {
    /// Create a new ConductorClient with embedded Conductor
    pub fn new(backend: B, config: ConductorConfig) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(100);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Start the Conductor (health check, session announcement)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::Connected {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Send a user message to the Conductor
    pub async fn send_message(&mut self, content: String) -> anyhow::Result<()> {
        let event = SurfaceEvent::UserMessage {
            event_id: SurfaceEvent::new_event_id(),
            content,
        };
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor that user is typing
    pub async fn user_typing(&mut self, typing: bool) -> anyhow::Result<()> {
        let event = SurfaceEvent::UserTyping { typing };
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::QuitRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor of resize
    pub async fn resized(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        let event = SurfaceEvent::Resized {
            event_id: SurfaceEvent::new_event_id(),
            width,
            height,
        };
        self.conductor.handle_event(event).await
    }

    /// Poll for the outstanding reply (must be called regularly)
    pub async fn poll_reply(&mut self) -> bool {
        self.conductor.poll_reply().await
    }

    /// Wait for the outstanding reply (headless use and tests)
    pub async fn wait_for_reply(&mut self) -> bool {
        self.conductor.wait_for_reply().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Whether a reply is outstanding
    pub fn is_reply_pending(&self) -> bool {
        self.conductor.is_reply_pending()
    }
}
