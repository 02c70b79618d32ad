//! Default Resolver: the conservative answer for any pending decision.
//!
//! Defaults never make a strategic choice. Each one is a no-op (pass, cancel,
//! minimum) or the single option the payload forces. Ambiguous pool payment
//! is handed back as [`DefaultOutcome::NeedsManualChoice`] unless the caller
//! opts into [`AmbiguityPolicy::FirstAvailable`].
use crate::answer::EngineAnswer;
use crate::decision::{Decision, MultiAmountRequest, PendingAction};
use crate::ids::ObjectId;
use crate::mana::{ManaPlan, plan_payment};
use crate::payment::FailedPaymentSet;
use crate::snapshot::GameSnapshot;

/// Label of the default that was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionTaken {
    Declined,
    PassedPriority,
    SelectedFirstTarget,
    CancelledTarget,
    SelectedFirstAbility,
    NoAbilities,
    SelectedFirstChoice,
    NoChoices,
    SelectedPile1,
    TappedManaSource,
    SpentPoolMana,
    CancelledMana,
    SelectedMinAmount,
    SelectedMinMultiAmount,
}

/// What to do when several pool colours could pay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Leave the decision for the agent.
    #[default]
    Manual,
    /// Spend the first colour in WUBRGC order.
    FirstAvailable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultAnswer {
    pub answer: EngineAnswer,
    pub taken: ActionTaken,
    /// Object to add to the failed-payment set once the answer is sent.
    pub record_failed: Option<ObjectId>,
}

impl DefaultAnswer {
    fn new(answer: EngineAnswer, taken: ActionTaken) -> Self {
        Self {
            answer,
            taken,
            record_failed: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultOutcome {
    Answer(DefaultAnswer),
    NeedsManualChoice { reason: String },
}

impl DefaultOutcome {
    pub fn answer(&self) -> Option<&DefaultAnswer> {
        match self {
            DefaultOutcome::Answer(answer) => Some(answer),
            DefaultOutcome::NeedsManualChoice { .. } => None,
        }
    }
}

/// Conservative default for a pending decision.
pub fn default_answer(
    pending: &PendingAction,
    snapshot: &GameSnapshot,
    failed: &FailedPaymentSet,
) -> DefaultOutcome {
    default_answer_with(pending, snapshot, failed, AmbiguityPolicy::Manual)
}

pub fn default_answer_with(
    pending: &PendingAction,
    snapshot: &GameSnapshot,
    failed: &FailedPaymentSet,
    policy: AmbiguityPolicy,
) -> DefaultOutcome {
    let answer = match &pending.decision {
        Decision::Ask => DefaultAnswer::new(EngineAnswer::Boolean(false), ActionTaken::Declined),
        Decision::Select => {
            DefaultAnswer::new(EngineAnswer::Boolean(false), ActionTaken::PassedPriority)
        }
        Decision::Target(request) => match request.candidates().first() {
            Some(first) if request.required => DefaultAnswer::new(
                EngineAnswer::Object(Some(*first)),
                ActionTaken::SelectedFirstTarget,
            ),
            _ => DefaultAnswer::new(EngineAnswer::Boolean(false), ActionTaken::CancelledTarget),
        },
        Decision::ChooseAbility { options } => match options.first() {
            Some(first) => DefaultAnswer::new(
                EngineAnswer::Object(Some(first.id)),
                ActionTaken::SelectedFirstAbility,
            ),
            None => DefaultAnswer::new(EngineAnswer::Object(None), ActionTaken::NoAbilities),
        },
        Decision::ChooseChoice { options } => match options.first() {
            Some(first) => DefaultAnswer::new(
                EngineAnswer::Text(Some(first.answer().to_string())),
                ActionTaken::SelectedFirstChoice,
            ),
            None => DefaultAnswer::new(EngineAnswer::Text(None), ActionTaken::NoChoices),
        },
        Decision::ChoosePile { .. } => {
            DefaultAnswer::new(EngineAnswer::Boolean(true), ActionTaken::SelectedPile1)
        }
        Decision::PlayMana | Decision::PlayXMana => {
            return mana_default(pending, snapshot, failed, policy);
        }
        Decision::GetAmount { min, .. } => {
            DefaultAnswer::new(EngineAnswer::Integer(*min), ActionTaken::SelectedMinAmount)
        }
        Decision::GetMultiAmount(request) => DefaultAnswer::new(
            EngineAnswer::Amounts(minimum_amounts(request)),
            ActionTaken::SelectedMinMultiAmount,
        ),
    };
    DefaultOutcome::Answer(answer)
}

/// Every item at its own minimum, then the shortfall to `total_min` filled
/// in item order without passing any item's maximum.
fn minimum_amounts(request: &MultiAmountRequest) -> Vec<i32> {
    let mut amounts: Vec<i32> = request.items.iter().map(|item| item.min).collect();
    let mut missing = request.total_min - amounts.iter().sum::<i32>();
    for (amount, item) in amounts.iter_mut().zip(&request.items) {
        if missing <= 0 {
            break;
        }
        let room = (item.max - *amount).max(0);
        let add = room.min(missing);
        *amount += add;
        missing -= add;
    }
    amounts
}

fn mana_default(
    pending: &PendingAction,
    snapshot: &GameSnapshot,
    failed: &FailedPaymentSet,
    policy: AmbiguityPolicy,
) -> DefaultOutcome {
    let spend = |mana| {
        snapshot.my_player_id.map(|player| {
            DefaultOutcome::Answer(DefaultAnswer::new(
                EngineAnswer::PoolMana { player, mana },
                ActionTaken::SpentPoolMana,
            ))
        })
    };

    match plan_payment(&pending.prompt, snapshot) {
        ManaPlan::Tap(source) => DefaultOutcome::Answer(DefaultAnswer::new(
            EngineAnswer::Object(Some(source)),
            ActionTaken::TappedManaSource,
        )),
        ManaPlan::Spend(mana) => spend(mana).unwrap_or_else(|| cancel_payment(None)),
        ManaPlan::Ambiguous(colors) => match (policy, colors.first()) {
            (AmbiguityPolicy::FirstAvailable, Some(first)) => {
                spend(*first).unwrap_or_else(|| cancel_payment(None))
            }
            _ => DefaultOutcome::NeedsManualChoice {
                reason: format!(
                    "mana pool holds {} usable colours and the cost names none of them",
                    colors.len()
                ),
            },
        },
        ManaPlan::Unavailable { paying_for } => {
            cancel_payment(paying_for.filter(|id| !failed.contains(*id)))
        }
    }
}

fn cancel_payment(paying_for: Option<ObjectId>) -> DefaultOutcome {
    DefaultOutcome::Answer(DefaultAnswer {
        answer: EngineAnswer::Boolean(false),
        taken: ActionTaken::CancelledMana,
        record_failed: paying_for,
    })
}
