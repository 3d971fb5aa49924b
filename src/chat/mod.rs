//! Chat view: relays typed questions to the SQL agent and records the replies.
//!
//! A submission is split in two steps so the user message can be shown
//! before the agent has answered:
//!
//! 1. [`submit`] appends the user message and registers a pending question.
//! 2. [`answer`] sends the pending question to the agent and appends the bot
//!    reply (or the fallback notice).
//!
//! Replies are appended in the order they resolve. Two questions in flight at
//! once may therefore be answered out of order; nothing guards against that.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::domain::{ChatMessage, Transcript};
use crate::session::View;

/// Handle for a question that has been shown but not answered yet.
pub type PendingId = u64;

#[derive(Debug)]
struct Pending {
    question: String,
    in_flight: bool,
}

/// State owned by one mounted chat view.
#[derive(Debug, Default)]
pub struct ChatView {
    transcript: Transcript,
    pending: BTreeMap<PendingId, Pending>,
    next_pending: PendingId,
}

/// What [`submit`] produced for a non-blank input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submitted {
    pub message: ChatMessage,
    pub pending: PendingId,
}

impl ChatView {
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while at least one question is waiting for its reply.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Ids of questions still waiting for a reply, oldest first.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<PendingId> {
        self.pending.keys().copied().collect()
    }

    /// Append the user message and park the question until it is answered.
    ///
    /// Blank input is ignored entirely.
    pub fn begin(&mut self, input: &str) -> Option<Submitted> {
        if input.trim().is_empty() {
            return None;
        }

        let message = ChatMessage::user(input);
        self.transcript.push(message.clone());

        let id = self.next_pending;
        self.next_pending += 1;
        self.pending.insert(
            id,
            Pending {
                question: input.to_string(),
                in_flight: false,
            },
        );

        Some(Submitted {
            message,
            pending: id,
        })
    }

    /// Claim a pending question for sending. Each question is claimed once.
    pub fn claim(&mut self, id: PendingId) -> Option<String> {
        let pending = self.pending.get_mut(&id)?;
        if pending.in_flight {
            return None;
        }
        pending.in_flight = true;
        Some(pending.question.clone())
    }

    /// Record the reply for a claimed question and clear its loading marker.
    pub fn resolve(&mut self, id: PendingId, reply: ChatMessage) -> Option<ChatMessage> {
        self.pending.remove(&id)?;
        self.transcript.push(reply.clone());
        Some(reply)
    }
}

/// Step one of a submission. See [`ChatView::begin`].
pub fn submit(view: &View<ChatView>, input: &str) -> Option<Submitted> {
    let submitted = view.update(|chat| chat.begin(input))?;
    info!(
        name: "chat.question.submitted",
        view = %view.id(),
        pending = submitted.pending,
        "Question submitted"
    );
    Some(submitted)
}

/// Step two of a submission: ask the agent and append its reply.
///
/// Returns `None` when `pending` is unknown or already being answered.
pub async fn answer(
    view: &View<ChatView>,
    backend: &dyn Backend,
    pending: PendingId,
) -> Option<ChatMessage> {
    let question = view.update(|chat| chat.claim(pending))?;

    let reply = match backend.ask(&question).await {
        Ok(final_answer) => ChatMessage::answer(&final_answer),
        Err(e) => {
            warn!(
                name: "chat.answer.failed",
                view = %view.id(),
                pending,
                error = %e,
                "SQL agent request failed"
            );
            ChatMessage::fallback()
        }
    };

    view.update(|chat| chat.resolve(pending, reply))
}
