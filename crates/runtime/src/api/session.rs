//! Outbound boundary towards the game engine.
//!
//! The bridge never calls into the engine directly. Answers and chat lines are
//! handed to an [`EngineSession`], which is invoked while the context lock is
//! held so an answer is on its way before the slot reads as empty.
use decision_core::{ChatId, ContextId, DecisionId, EngineAnswer};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::errors::SessionError;

/// Sink for messages the engine must receive.
///
/// Implementations must not block: they run under the per-context mutex.
pub trait EngineSession: Send + Sync {
    fn answer(
        &self,
        context: ContextId,
        decision: DecisionId,
        answer: &EngineAnswer,
    ) -> Result<(), SessionError>;

    fn chat(&self, chat: ChatId, text: &str) -> Result<(), SessionError>;
}

/// Message written to the engine link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Answer {
        context: ContextId,
        decision: DecisionId,
        answer: EngineAnswer,
    },
    Chat {
        chat: ChatId,
        text: String,
    },
}

/// [`EngineSession`] that forwards every message over an unbounded channel.
///
/// The receiving half is drained by whatever owns the engine connection.
#[derive(Clone)]
pub struct ChannelSession {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ChannelSession {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EngineSession for ChannelSession {
    fn answer(
        &self,
        context: ContextId,
        decision: DecisionId,
        answer: &EngineAnswer,
    ) -> Result<(), SessionError> {
        self.tx
            .send(Outbound::Answer {
                context,
                decision,
                answer: answer.clone(),
            })
            .map_err(|_| SessionError::Closed)
    }

    fn chat(&self, chat: ChatId, text: &str) -> Result<(), SessionError> {
        self.tx
            .send(Outbound::Chat {
                chat,
                text: text.to_string(),
            })
            .map_err(|_| SessionError::Closed)
    }
}
