//! Session Management
//!
//! A session is the ordered conversation shown on screen plus the
//! reply-pending flag. It lives for the lifetime of the process and is never
//! persisted.

use thiserror::Error;

use crate::messages::{ChatMessage, SessionId, GREETING};

/// Errors raised by session bookkeeping
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A reply is already outstanding
    #[error("a reply is already pending")]
    ReplyPending,

    /// `finish_reply` was called with nothing outstanding
    #[error("no reply is pending")]
    NoReplyPending,
}

/// A conversation session
#[derive(Clone, Debug)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,
    /// Conversation history, append-only
    messages: Vec<ChatMessage>,
    /// Whether a reply is outstanding
    reply_pending: bool,
}

impl Session {
    /// Create a new session opened by the bot greeting
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create a session with a specific ID
    #[must_use]
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            messages: vec![ChatMessage::bot(GREETING)],
            reply_pending: false,
        }
    }

    /// The conversation so far, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages in the conversation
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// A session always holds at least the greeting
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether a reply is outstanding
    pub fn is_reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Mark a reply as outstanding
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ReplyPending`] if one already is.
    pub fn begin_reply(&mut self) -> Result<(), SessionError> {
        if self.reply_pending {
            return Err(SessionError::ReplyPending);
        }
        self.reply_pending = true;
        Ok(())
    }

    /// Append the bot's reply and clear the pending flag
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoReplyPending`] if nothing was outstanding;
    /// the message is not appended in that case.
    pub fn finish_reply(&mut self, reply: ChatMessage) -> Result<(), SessionError> {
        if !self.reply_pending {
            return Err(SessionError::NoReplyPending);
        }
        self.messages.push(reply);
        self.reply_pending = false;
        Ok(())
    }

    /// Drop the outstanding reply without appending anything
    ///
    /// Returns whether a reply was pending.
    pub fn abandon_reply(&mut self) -> bool {
        std::mem::replace(&mut self.reply_pending, false)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
