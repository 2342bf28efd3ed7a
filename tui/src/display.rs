//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayMessage: A rendered chat bubble
//! - DisplayNotification: A transient status-bar notice

use std::time::{Duration, Instant};

use dream11_conductor::{ChatMessage, ConductorMessage, ConductorState, NotifyLevel, Origin, SessionId};

/// How long a notification stays in the status bar
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// A rendered chat bubble
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Message text, newlines preserved
    pub text: String,
    /// Who sent it (controls alignment and palette)
    pub origin: Origin,
    /// When it arrived (drives the slide-in)
    pub arrived: Instant,
}

impl DisplayMessage {
    /// Create a display message that arrived now
    pub fn new(message: ChatMessage) -> Self {
        Self {
            text: message.text,
            origin: message.origin,
            arrived: Instant::now(),
        }
    }

    /// Whether this is a bot bubble
    pub fn is_bot(&self) -> bool {
        self.origin == Origin::Bot
    }
}

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
    /// When it was raised
    pub raised: Instant,
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Chat bubbles, oldest first
    pub messages: Vec<DisplayMessage>,
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Health check result (`None` until reported)
    pub backend_online: Option<bool>,
    /// Session ID, once announced
    pub session_id: Option<SessionId>,
    /// Where requests go
    pub endpoint: String,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Goodbye text from the Conductor
    pub quit_message: Option<String>,
    /// Bumped whenever the list or the pending flag changes
    pub revision: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            conductor_state: ConductorState::Initializing,
            backend_online: None,
            session_id: None,
            endpoint: String::new(),
            notification: None,
            quit_message: None,
            revision: 0,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::Message { message } => {
                self.messages.push(DisplayMessage::new(message));
                self.revision += 1;
            }
            ConductorMessage::State { state } => {
                let was_pending = self.is_reply_pending();
                self.conductor_state = state;
                if was_pending != self.is_reply_pending() {
                    self.revision += 1;
                }
            }
            ConductorMessage::BackendStatus { online } => {
                self.backend_online = Some(online);
            }
            ConductorMessage::SessionInfo {
                session_id,
                endpoint,
            } => {
                self.session_id = Some(session_id);
                self.endpoint = endpoint;
            }
            ConductorMessage::Notify { level, message } => {
                self.notification = Some(DisplayNotification {
                    level,
                    message,
                    raised: Instant::now(),
                });
            }
            ConductorMessage::Quit { message } => {
                // The app will handle quitting
                self.quit_message = message;
            }
        }
    }

    /// Expire stale notifications
    pub fn update(&mut self) {
        if let Some(ref notification) = self.notification {
            if notification.raised.elapsed() >= NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    /// Whether a reply is outstanding (typing indicator shown, input disabled)
    pub fn is_reply_pending(&self) -> bool {
        self.conductor_state == ConductorState::AwaitingReply
    }

    /// Whether the input row takes keystrokes
    pub fn accepts_input(&self) -> bool {
        self.conductor_state.accepts_input()
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
