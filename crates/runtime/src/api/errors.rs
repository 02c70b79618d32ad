//! Unified error types surfaced by the bridge runtime API.
//!
//! Separates fatal engine-side failures (the context is torn down) from caller
//! mistakes that leave the pending decision untouched.
use std::fmt;

use decision_core::{ChoiceError, ContextId, DecisionId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("engine protocol violation in context {context}: {detail}")]
    ProtocolViolation { context: ContextId, detail: String },

    #[error("no decision is pending")]
    NoPendingAction,

    #[error("decision {provided} is no longer pending (current: {current})")]
    StaleDecision {
        provided: DecisionId,
        current: CurrentDecision,
    },

    #[error(transparent)]
    Choice(#[from] ChoiceError),

    #[error("no game context is active")]
    NoActiveContext,

    #[error("context {context} is closed: {reason}")]
    ContextClosed { context: ContextId, reason: String },

    #[error("engine session failed: {0}")]
    EngineDisconnected(#[source] SessionError),

    #[error("no chat channel is known for context {0}")]
    ChatUnavailable(ContextId),

    #[error("{what} lock poisoned")]
    LockPoisoned { what: &'static str },

    #[error("runtime requires an engine session before building")]
    MissingSession,

    #[error("ingest channel closed")]
    IngestChannelClosed,

    #[error("ingest worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl BridgeError {
    /// Stable snake_case tag for structured error replies.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::ProtocolViolation { .. } => "protocol_violation",
            BridgeError::NoPendingAction => "no_pending_action",
            BridgeError::StaleDecision { .. } => "stale_decision",
            BridgeError::Choice(err) => err.error_code(),
            BridgeError::NoActiveContext => "no_active_context",
            BridgeError::ContextClosed { .. } => "context_closed",
            BridgeError::EngineDisconnected(_) => "engine_disconnected",
            BridgeError::ChatUnavailable(_) => "chat_unavailable",
            BridgeError::LockPoisoned { .. } => "lock_poisoned",
            BridgeError::MissingSession => "missing_session",
            BridgeError::IngestChannelClosed => "ingest_channel_closed",
            BridgeError::WorkerJoin(_) => "worker_join",
        }
    }

    /// Fatal errors end the context; everything else may be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::ProtocolViolation { .. }
                | BridgeError::EngineDisconnected(_)
                | BridgeError::ContextClosed { .. }
                | BridgeError::LockPoisoned { .. }
        )
    }
}

/// Decision occupying the slot when a stale answer arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentDecision {
    None,
    Other(DecisionId),
}

impl fmt::Display for CurrentDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentDecision::None => write!(f, "none"),
            CurrentDecision::Other(id) => write!(f, "{id}"),
        }
    }
}

/// Failure reported by an [`EngineSession`](crate::EngineSession).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("engine link closed")]
    Closed,

    #[error("engine rejected message: {0}")]
    Rejected(String),
}
