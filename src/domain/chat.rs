//! Chat transcript types.

use serde::{Deserialize, Serialize};

/// Prefix put in front of every answer returned by the SQL agent.
pub const ANSWER_PREFIX: &str = "Answer: ";

/// Bot text appended when a question could not be answered.
pub const FALLBACK_REPLY: &str = "Something went wrong!";

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Typed by the person using the console.
    User,
    /// Produced from an agent reply (or the fallback notice).
    Bot,
}

/// A single entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    /// Create a user message carrying the question exactly as typed.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Create a bot message wrapping an agent answer.
    pub fn answer(final_answer: &str) -> Self {
        Self {
            role: ChatRole::Bot,
            text: format!("{ANSWER_PREFIX}{final_answer}"),
        }
    }

    /// Create the generic failure message.
    pub fn fallback() -> Self {
        Self {
            role: ChatRole::Bot,
            text: FALLBACK_REPLY.to_string(),
        }
    }
}

/// Ordered, append-only sequence of chat messages.
///
/// Messages have no identity beyond their position. Entries cannot be edited
/// or removed once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the transcript.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
