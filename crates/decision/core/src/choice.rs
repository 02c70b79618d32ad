//! Index-addressable projections of a pending decision.
//!
//! A [`ChoiceList`] belongs to exactly one [`DecisionId`]. Indices mean
//! nothing once that decision is answered or replaced.
use crate::decision::DecisionKind;
use crate::ids::{DecisionId, ObjectId};
use crate::mana::ManaColor;
use crate::snapshot::GameSnapshot;

/// How the caller is expected to answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ResponseType {
    Boolean,
    Select,
    Index,
    Pile,
    Amount,
    MultiAmount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ChoiceKind {
    Play,
    Activate,
    Target,
    Ability,
    Option,
    TapSource,
    PoolMana,
}

/// Engine-native value behind a choice. Never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HiddenAnswer {
    Object(ObjectId),
    Text(String),
    Pool(ManaColor),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Choice {
    pub index: usize,
    pub description: String,
    #[cfg_attr(feature = "serde", serde(rename = "choice_type"))]
    pub kind: ChoiceKind,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) answer: HiddenAnswer,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceList {
    decision: DecisionId,
    choices: Vec<Choice>,
}

impl ChoiceList {
    pub(crate) fn new(decision: DecisionId) -> Self {
        Self {
            decision,
            choices: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, description: String, kind: ChoiceKind, answer: HiddenAnswer) {
        let index = self.choices.len();
        self.choices.push(Choice {
            index,
            description,
            kind,
            answer,
        });
    }

    pub fn decision(&self) -> DecisionId {
        self.decision
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.description.as_str()).collect()
    }

    pub(crate) fn get(&self, index: i64) -> Result<&Choice, crate::ChoiceError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.choices.get(i))
            .ok_or(crate::ChoiceError::IndexOutOfRange {
                index,
                len: self.choices.len(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlayerSummary {
    pub name: String,
    pub life: i32,
    pub is_you: bool,
}

/// Turn and phase information attached to every choices view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PhaseContext {
    pub turn: u32,
    pub phase: String,
    pub step: String,
    pub active_player: String,
    pub is_my_main_phase: bool,
    pub players: Vec<PlayerSummary>,
}

impl PhaseContext {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            turn: snapshot.turn,
            phase: snapshot.phase.clone(),
            step: snapshot.step.clone(),
            active_player: snapshot.active_player.clone(),
            is_my_main_phase: snapshot.is_my_main_phase(),
            players: snapshot
                .players
                .iter()
                .map(|p| PlayerSummary {
                    name: p.name.clone(),
                    life: p.life,
                    is_you: snapshot.is_me(p),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandCard {
    pub name: String,
    pub mana_cost: String,
    pub mana_value: u32,
    pub is_land: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub power_toughness: Option<String>,
}

/// Opening hand shown with a mulligan question.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MulliganInfo {
    pub your_hand: Vec<HandCard>,
    pub land_count: usize,
    pub hand_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AmountItemView {
    pub description: String,
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

/// Kind-specific extras; absent fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChoiceDetail {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub required: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub can_cancel: Option<bool>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub max: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub pile1: Option<Vec<String>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub pile2: Option<Vec<String>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub total_min: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub total_max: Option<i32>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub items: Option<Vec<AmountItemView>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub mulligan: Option<MulliganInfo>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub paying_for: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub hint: Option<String>,
}

/// What `get_choices` returns to the agent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChoicesView {
    pub decision_id: DecisionId,
    pub action_type: DecisionKind,
    pub message: String,
    pub response_type: ResponseType,
    pub context: PhaseContext,
    pub choices: Vec<Choice>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub detail: ChoiceDetail,
}

/// Caller-supplied answer fields. Which ones are required depends on the
/// decision kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChoiceInput {
    pub index: Option<i64>,
    pub answer: Option<bool>,
    pub amount: Option<i32>,
    pub amounts: Option<Vec<i32>>,
    pub pile: Option<i64>,
    /// Decision the caller believes it is answering.
    pub decision_id: Option<DecisionId>,
}

impl ChoiceInput {
    pub fn index(index: i64) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    pub fn answer(answer: bool) -> Self {
        Self {
            answer: Some(answer),
            ..Self::default()
        }
    }

    pub fn amount(amount: i32) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn amounts(amounts: Vec<i32>) -> Self {
        Self {
            amounts: Some(amounts),
            ..Self::default()
        }
    }

    pub fn pile(pile: i64) -> Self {
        Self {
            pile: Some(pile),
            ..Self::default()
        }
    }

    pub fn for_decision(mut self, decision: DecisionId) -> Self {
        self.decision_id = Some(decision);
        self
    }
}
