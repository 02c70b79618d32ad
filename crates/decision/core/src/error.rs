//! Caller input errors raised while validating a choice.
//!
//! All of these are recoverable: the decision they were raised against stays
//! pending so the caller can retry.
use crate::decision::DecisionKind;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceError {
    #[error("index {index} out of range 0..{len} (call get_choices first)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("no choice list built for the current decision (call get_choices first)")]
    NoChoiceList,

    #[error("'{field}' is required to answer {kind}")]
    MissingField {
        field: &'static str,
        kind: DecisionKind,
    },

    #[error("{kind} cannot be answered with {provided}")]
    WrongAnswerType {
        kind: DecisionKind,
        provided: &'static str,
    },

    #[error("pile must be 1 or 2, got {0}")]
    InvalidPile(i64),

    #[error("expected {expected} amounts, got {provided}")]
    AmountCount { expected: usize, provided: usize },

    #[error("amount {value} for '{label}' is outside {min}..={max}")]
    AmountOutOfBounds {
        label: String,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("amounts total {total}, outside {min}..={max}")]
    TotalOutOfBounds { total: i32, min: i32, max: i32 },

    #[error("bridge player is unknown, pool mana cannot be spent")]
    UnknownPlayer,
}

impl ChoiceError {
    /// Stable identifier for structured error replies.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChoiceError::IndexOutOfRange { .. } => "index_out_of_range",
            ChoiceError::NoChoiceList => "no_choice_list",
            ChoiceError::MissingField { .. } => "missing_field",
            ChoiceError::WrongAnswerType { .. } => "wrong_answer_type",
            ChoiceError::InvalidPile(_) => "invalid_pile",
            ChoiceError::AmountCount { .. } => "amount_count",
            ChoiceError::AmountOutOfBounds { .. } => "amount_out_of_bounds",
            ChoiceError::TotalOutOfBounds { .. } => "total_out_of_bounds",
            ChoiceError::UnknownPlayer => "unknown_player",
        }
    }
}
