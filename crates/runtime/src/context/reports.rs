//! Structured results returned by context operations.
//!
//! These serialize directly into tool replies. None of them carries an engine
//! identifier.
use decision_core::{ActionTaken, DecisionId, DecisionKind, PendingAction};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
    pub decision_id: DecisionId,
    pub action_type: DecisionKind,
    pub message: String,
}

impl From<&PendingAction> for PendingSummary {
    fn from(action: &PendingAction) -> Self {
        Self {
            decision_id: action.id,
            action_type: action.kind(),
            message: action.prompt.clone(),
        }
    }
}

/// An answer that reached the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerReport {
    pub decision_id: DecisionId,
    pub action_type: DecisionKind,
    /// Agent-facing rendering of the answer.
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<ActionTaken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualChoice {
    pub decision_id: DecisionId,
    pub action_type: DecisionKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DefaultResolution {
    Answered(AnswerReport),
    NeedsManualChoice(ManualChoice),
}

/// What became of a decision handed to the context by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// Waiting for the agent.
    Pending(DecisionId),
    /// Settled by automatic mana payment without ever becoming visible.
    Paid(AnswerReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WaitReport {
    pub action_pending: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingSummary>,
    pub timed_out: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub action_pending: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingSummary>,
    pub has_playable_cards: bool,
    pub actions_passed: u32,
    pub timed_out: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub event_occurred: bool,
    pub new_log: String,
    pub new_chars: usize,
    pub actions_taken: u32,
    pub timed_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_manual_choice: Option<ManualChoice>,
    pub game_over: bool,
}

/// The end of the game log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogTail {
    pub log: String,
    pub total_chars: usize,
    pub returned_chars: usize,
    pub truncated: bool,
}
