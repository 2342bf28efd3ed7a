//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces forward user
//! actions without interpreting them; the Conductor decides what they mean.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// Surface connected to Conductor
    Connected {
        /// Event ID for tracing
        event_id: EventId,
    },

    /// Surface window/viewport resized
    Resized {
        /// Event ID for tracing
        event_id: EventId,
        /// New width (in surface-specific units)
        width: u32,
        /// New height (in surface-specific units)
        height: u32,
    },

    /// User submitted the input field
    UserMessage {
        /// Event ID for tracing
        event_id: EventId,
        /// Raw input, untrimmed
        content: String,
    },

    /// User is typing
    UserTyping {
        /// Whether user is currently typing
        typing: bool,
    },

    /// User requested quit
    QuitRequested {
        /// Event ID for tracing
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Build a `UserMessage` event with a fresh ID
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            event_id: Self::new_event_id(),
            content: content.into(),
        }
    }

    /// Get the event ID if this event has one
    #[must_use]
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::Connected { event_id }
            | Self::Resized { event_id, .. }
            | Self::UserMessage { event_id, .. }
            | Self::QuitRequested { event_id } => Some(event_id),
            Self::UserTyping { .. } => None,
        }
    }
}
