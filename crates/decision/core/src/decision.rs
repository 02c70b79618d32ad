//! Decision payloads pushed by the engine.
//!
//! Every engine notification that needs an answer is one [`Decision`]. The
//! variant is the decision kind; its fields are the kind-specific payload.
use crate::ids::{ContextId, DecisionId, ObjectId};
use crate::snapshot::CardView;

/// Closed set of decision kinds.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DecisionKind {
    /// Yes/no question (mulligan, optional effects).
    Ask,
    /// Priority: pass or play something.
    Select,
    Target,
    ChooseAbility,
    ChoosePile,
    ChooseChoice,
    /// Pay a fixed mana cost.
    PlayMana,
    /// Pay a variable (X) mana cost.
    PlayXMana,
    GetAmount,
    GetMultiAmount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetRequest {
    pub required: bool,
    /// Explicit legal targets.
    pub targets: Vec<ObjectId>,
    /// Fallback candidate list some engine messages carry instead.
    pub possible_targets: Vec<ObjectId>,
    /// Cards shown for selection; their ids are the last fallback.
    pub cards: Vec<CardView>,
}

impl TargetRequest {
    /// Candidate targets in engine order: explicit targets, then possible
    /// targets, then the ids of the shown cards.
    pub fn candidates(&self) -> Vec<ObjectId> {
        if !self.targets.is_empty() {
            return self.targets.clone();
        }
        if !self.possible_targets.is_empty() {
            return self.possible_targets.clone();
        }
        self.cards.iter().map(|c| c.id).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityOption {
    pub id: ObjectId,
    pub label: String,
}

/// One entry of a choose-from-list decision.
///
/// Keyed vocabularies answer with the key; plain lists answer with the label.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListOption {
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: Option<String>,
    pub label: String,
}

impl ListOption {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            key: None,
            label: label.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            label: label.into(),
        }
    }

    /// Value sent back to the engine when this option is picked.
    pub fn answer(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmountItem {
    pub label: String,
    pub min: i32,
    pub max: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MultiAmountRequest {
    pub total_min: i32,
    pub total_max: i32,
    pub items: Vec<AmountItem>,
}

/// Kind-specific decision payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Decision {
    Ask,
    Select,
    Target(TargetRequest),
    ChooseAbility {
        options: Vec<AbilityOption>,
    },
    ChoosePile {
        pile1: Vec<CardView>,
        pile2: Vec<CardView>,
    },
    ChooseChoice {
        options: Vec<ListOption>,
    },
    PlayMana,
    PlayXMana,
    GetAmount {
        min: i32,
        max: i32,
    },
    GetMultiAmount(MultiAmountRequest),
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Decision::Ask => DecisionKind::Ask,
            Decision::Select => DecisionKind::Select,
            Decision::Target(_) => DecisionKind::Target,
            Decision::ChooseAbility { .. } => DecisionKind::ChooseAbility,
            Decision::ChoosePile { .. } => DecisionKind::ChoosePile,
            Decision::ChooseChoice { .. } => DecisionKind::ChooseChoice,
            Decision::PlayMana => DecisionKind::PlayMana,
            Decision::PlayXMana => DecisionKind::PlayXMana,
            Decision::GetAmount { .. } => DecisionKind::GetAmount,
            Decision::GetMultiAmount(_) => DecisionKind::GetMultiAmount,
        }
    }

    pub fn is_mana_payment(&self) -> bool {
        matches!(self, Decision::PlayMana | Decision::PlayXMana)
    }
}

/// The single outstanding decision of a context.
///
/// Immutable once stored; the slot hands it out exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PendingAction {
    pub id: DecisionId,
    pub context: ContextId,
    pub decision: Decision,
    pub prompt: String,
}

impl PendingAction {
    pub fn kind(&self) -> DecisionKind {
        self.decision.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_screaming_snake() {
        assert_eq!(DecisionKind::PlayXMana.to_string(), "PLAY_X_MANA");
        assert_eq!(
            "get_multi_amount".parse::<DecisionKind>().ok(),
            Some(DecisionKind::GetMultiAmount)
        );
    }

    #[test]
    fn test_target_candidates_fall_back_in_order() {
        let a = ObjectId::random();
        let b = ObjectId::random();
        let mut request = TargetRequest {
            cards: vec![CardView::new(b, "Shown")],
            ..TargetRequest::default()
        };
        assert_eq!(request.candidates(), vec![b]);
        request.possible_targets = vec![a];
        assert_eq!(request.candidates(), vec![a]);
        request.targets = vec![b, a];
        assert_eq!(request.candidates(), vec![b, a]);
    }

    #[test]
    fn test_list_option_answers_with_key_when_present() {
        assert_eq!(ListOption::keyed("R", "Red").answer(), "R");
        assert_eq!(ListOption::plain("Red").answer(), "Red");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decision_payload_is_tagged_by_kind() {
        let json = r#"{"kind":"get_amount","min":1,"max":4}"#;
        let decision: Decision = serde_json::from_str(json).unwrap();
        assert_eq!(decision, Decision::GetAmount { min: 1, max: 4 });
        assert_eq!(decision.kind(), DecisionKind::GetAmount);
    }
}
