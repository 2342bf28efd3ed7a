//! Conductor Messages
//!
//! The chat data model and the messages sent from the Conductor to UI
//! surfaces.
//!
//! # Design Philosophy
//!
//! The Conductor owns the conversation. Surfaces are pure renderers that
//! display what the Conductor tells them to: every [`ChatMessage`] reaches a
//! surface as a [`ConductorMessage::Message`], and the reply-pending flag
//! reaches it as a [`ConductorMessage::State`] change.

use serde::{Deserialize, Serialize};

/// Greeting the bot opens every session with
pub const GREETING: &str = "Hello! I'm Dream11's support bot. How can I help you today?";

/// Shown when the backend answered but none of the reply fields were present
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process that request.";

/// Shown for every failed request, whatever the cause
pub const CONNECTION_ERROR_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Who a chat message came from
///
/// Controls styling and alignment on every surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// The support bot (left-aligned)
    Bot,
    /// The person typing (right-aligned)
    User,
}

/// A single entry in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display text, newlines and spacing preserved
    pub text: String,
    /// Provenance tag
    pub origin: Origin,
}

impl ChatMessage {
    /// Create a bot-origin message
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Bot,
        }
    }

    /// Create a user-origin message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
        }
    }

    /// Whether the bot sent this message
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.origin == Origin::Bot
    }
}

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    /// A message was appended to the conversation
    Message {
        /// The appended message
        message: ChatMessage,
    },

    /// Conductor state change
    State {
        /// The new state
        state: ConductorState,
    },

    /// Result of the backend health check
    BackendStatus {
        /// Whether the backend answered the health check
        online: bool,
    },

    /// Session information
    SessionInfo {
        /// Session ID
        session_id: SessionId,
        /// Full URL of the chat endpoint
        endpoint: String,
    },

    /// System notification (never part of the transcript)
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Message content
        message: String,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Event identifier, logged with every surface event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Starting up, health check not done yet
    Initializing,
    /// Ready for input
    Ready,
    /// A reply is pending; input is disabled
    AwaitingReply,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Connecting...",
            Self::Ready => "Online",
            Self::AwaitingReply => "Typing...",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether the surface should accept a submission in this state
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Initializing | Self::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let bot = ChatMessage::bot("Hi");
        let user = ChatMessage::user("Hello");
        assert!(bot.is_bot());
        assert!(!user.is_bot());
        assert_eq!(user.origin, Origin::User);
        assert_eq!(user.text, "Hello");
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn test_conductor_state_description() {
        assert_eq!(ConductorState::Ready.description(), "Online");
        assert_eq!(ConductorState::AwaitingReply.description(), "Typing...");
    }

    #[test]
    fn test_awaiting_reply_blocks_input() {
        assert!(ConductorState::Ready.accepts_input());
        assert!(ConductorState::Initializing.accepts_input());
        assert!(!ConductorState::AwaitingReply.accepts_input());
        assert!(!ConductorState::ShuttingDown.accepts_input());
    }
}
