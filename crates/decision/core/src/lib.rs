//! Pure decision logic for the card-game decision bridge.
//!
//! `decision-core` owns the vocabulary shared by the runtime and the tool
//! server: identifiers, the snapshot the engine pushes, decision payloads and
//! answers, plus the two policy engines built on them:
//! - [`indexer`] turns a pending decision into an indexed list of choices and
//!   validates index-based answers
//! - [`resolver`] computes the conservative default answer
//!
//! [`view`] renders a snapshot for the agent without engine identifiers.
//!
//! Nothing here blocks, locks, or performs I/O.
pub mod answer;
pub mod choice;
pub mod decision;
pub mod diff;
pub mod error;
pub mod ids;
pub mod indexer;
pub mod mana;
pub mod payment;
pub mod resolver;
pub mod snapshot;
pub mod view;

pub use answer::EngineAnswer;
pub use choice::{
    AmountItemView, Choice, ChoiceDetail, ChoiceInput, ChoiceKind, ChoiceList, ChoicesView,
    HandCard, MulliganInfo, PhaseContext, PlayerSummary, ResponseType,
};
pub use decision::{
    AbilityOption, AmountItem, Decision, DecisionKind, ListOption, MultiAmountRequest,
    PendingAction, TargetRequest,
};
pub use diff::StateBaseline;
pub use error::ChoiceError;
pub use ids::{ChatId, ContextId, DecisionId, ObjectId, PlayerId};
pub use mana::{ManaColor, ManaPlan, ManaPool};
pub use payment::FailedPaymentSet;
pub use resolver::{ActionTaken, AmbiguityPolicy, DefaultAnswer, DefaultOutcome};
pub use snapshot::{CardTypes, CardView, GameSnapshot, PlayableObject, PlayerView, Zone};
pub use view::{CardState, GameStateView, PlayableState, PlayerState};
