//! Per-game context: the decision slot, its caches, and the stores.
//!
//! One [`Mutex`] guards the slot, the cached [`ChoiceList`], the
//! failed-payment set, and the lifecycle status. Every producer mutation
//! (new decision, snapshot, log line, game over) happens under that mutex and
//! ends with `notify_all` on the context condition variable, so the guarded
//! waits in [`wait`] cannot miss a wake-up.
//!
//! Lock order: context mutex, then the snapshot or log lock. Readers that
//! only touch the stores never take the context mutex.
mod reports;
mod wait;

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use decision_core::resolver::default_answer_with;
use decision_core::{
    ActionTaken, AmbiguityPolicy, ChatId, ChoiceInput, ChoiceList, ChoicesView, ContextId,
    Decision, DecisionId, DefaultOutcome, EngineAnswer, FailedPaymentSet, GameSnapshot, ManaPlan,
    PlayerId, indexer, mana,
};
use tracing::{debug, error, info, warn};

use crate::api::{BridgeError, CurrentDecision, EngineSession, Result};
use crate::slot::PendingSlot;
use crate::store::{LogBuffer, SnapshotStore};

pub use reports::{
    AnswerReport, DefaultResolution, DrainReport, LogTail, ManualChoice, PassReport,
    PendingSummary, Stored, WaitReport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextStatus {
    Active,
    /// The engine reported game over.
    Finished { message: String },
    /// Torn down after a protocol violation or a broken engine session.
    Closed { reason: String },
}

#[derive(Debug)]
struct ContextState {
    slot: PendingSlot,
    choices: Option<ChoiceList>,
    failed: FailedPaymentSet,
    player: Option<PlayerId>,
    chat: Option<ChatId>,
    status: ContextStatus,
}

pub struct GameContext {
    id: ContextId,
    log: LogBuffer,
    snapshot: SnapshotStore,
    state: Mutex<ContextState>,
    changed: Condvar,
    session: Arc<dyn EngineSession>,
}

impl GameContext {
    pub fn new(id: ContextId, session: Arc<dyn EngineSession>) -> Self {
        Self {
            id,
            log: LogBuffer::new(),
            snapshot: SnapshotStore::new(),
            state: Mutex::new(ContextState {
                slot: PendingSlot::new(),
                choices: None,
                failed: FailedPaymentSet::new(),
                player: None,
                chat: None,
                status: ContextStatus::Active,
            }),
            changed: Condvar::new(),
            session,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshot
    }

    pub fn status(&self) -> Result<ContextStatus> {
        Ok(self.lock()?.status.clone())
    }

    /// True once the game finished or the context was torn down.
    pub fn is_ended(&self) -> bool {
        self.lock()
            .map(|state| state.status != ContextStatus::Active)
            .unwrap_or(true)
    }

    pub fn player(&self) -> Result<Option<PlayerId>> {
        Ok(self.lock()?.player)
    }

    /// Records which seat the bridge plays and where chat goes.
    pub fn attach(&self, player: Option<PlayerId>, chat: Option<ChatId>) -> Result<()> {
        let mut state = self.lock()?;
        if player.is_some() {
            state.player = player;
        }
        if chat.is_some() {
            state.chat = chat;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------

    /// Replaces the snapshot and forgets failed payments from earlier turns.
    pub fn update_snapshot(&self, mut snapshot: GameSnapshot) -> Result<()> {
        let mut state = self.lock()?;
        if snapshot.my_player_id.is_none() {
            snapshot.my_player_id = state.player;
        }
        if state.failed.observe_turn(snapshot.turn) {
            debug!(context = %self.id, turn = snapshot.turn, "cleared failed payments");
        }
        self.snapshot.replace(snapshot)?;
        self.changed.notify_all();
        Ok(())
    }

    /// Appends a game log line and wakes waiters.
    pub fn append_log(&self, line: &str) -> Result<usize> {
        let _state = self.lock()?;
        let len = self.log.append(line)?;
        self.changed.notify_all();
        Ok(len)
    }

    /// Stores a decision pushed by the engine.
    ///
    /// A second decision while one is pending breaks the engine contract: the
    /// context is closed and every waiter is woken.
    pub fn store_decision(&self, decision: Decision, prompt: &str) -> Result<DecisionId> {
        let mut state = self.lock()?;
        let id = self.store_locked(&mut state, decision, prompt)?;
        self.changed.notify_all();
        Ok(id)
    }

    /// Stores a decision, paying it on the spot when it is a mana payment
    /// that a tap source or a single pool colour settles.
    ///
    /// Payment happens before the lock is released, so waiters never see a
    /// decision that was paid automatically.
    pub fn store_or_pay(&self, decision: Decision, prompt: &str) -> Result<Stored> {
        let mut state = self.lock()?;
        let id = self.store_locked(&mut state, decision, prompt)?;
        let snapshot = self.snapshot.current()?;
        if let Some(report) = self.pay_mana_locked(&mut state, &snapshot)? {
            return Ok(Stored::Paid(report));
        }
        self.changed.notify_all();
        Ok(Stored::Pending(id))
    }

    /// Marks the game as over. Nothing is pending afterwards.
    pub fn finish(&self, message: &str) -> Result<()> {
        let mut state = self.lock()?;
        if let Some(dropped) = state.slot.take() {
            warn!(context = %self.id, decision = %dropped.id, "game ended with a decision pending");
        }
        state.choices = None;
        state.status = ContextStatus::Finished {
            message: message.to_string(),
        };
        info!(context = %self.id, message, "game over");
        self.changed.notify_all();
        Ok(())
    }

    pub fn close(&self, reason: &str) -> Result<()> {
        let mut state = self.lock()?;
        self.close_locked(&mut state, reason.to_string());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Agent side (non-blocking)
    // ------------------------------------------------------------------

    pub fn pending(&self) -> Result<Option<PendingSummary>> {
        let state = self.lock()?;
        self.ensure_open(&state)?;
        Ok(state.slot.peek().map(PendingSummary::from))
    }

    /// Enumerates choices for the pending decision and caches the list.
    pub fn choices(&self) -> Result<ChoicesView> {
        let mut state = self.lock()?;
        self.ensure_open(&state)?;
        let snapshot = self.snapshot.current()?;
        let pending = state.slot.peek().ok_or(BridgeError::NoPendingAction)?;
        let (view, list) = indexer::build(pending, &snapshot, &state.failed);
        state.choices = Some(list);
        Ok(view)
    }

    /// Validates caller input and answers the pending decision.
    ///
    /// Validation failures leave the decision pending.
    pub fn choose(&self, input: &ChoiceInput) -> Result<AnswerReport> {
        let mut state = self.lock()?;
        self.ensure_open(&state)?;
        let snapshot = self.snapshot.current()?;

        let pending = match (state.slot.peek(), input.decision_id) {
            (Some(pending), Some(provided)) if pending.id != provided => {
                return Err(BridgeError::StaleDecision {
                    provided,
                    current: CurrentDecision::Other(pending.id),
                });
            }
            (Some(pending), _) => pending,
            (None, Some(provided)) => {
                return Err(BridgeError::StaleDecision {
                    provided,
                    current: CurrentDecision::None,
                });
            }
            (None, None) => return Err(BridgeError::NoPendingAction),
        };

        let answer = indexer::resolve(pending, state.choices.as_ref(), input, &snapshot)?;
        self.deliver(&mut state, answer, None, &snapshot)
    }

    /// Answers the pending decision with its conservative default.
    pub fn take_default(&self) -> Result<DefaultResolution> {
        let mut state = self.lock()?;
        self.ensure_open(&state)?;
        let snapshot = self.snapshot.current()?;
        if state.slot.is_empty() {
            return Err(BridgeError::NoPendingAction);
        }
        self.apply_default(&mut state, &snapshot, AmbiguityPolicy::Manual)
    }

    /// Defaults a specific decision if it is still the pending one.
    pub fn take_default_if(
        &self,
        decision: DecisionId,
        policy: AmbiguityPolicy,
    ) -> Result<Option<DefaultResolution>> {
        let mut state = self.lock()?;
        self.ensure_open(&state)?;
        if state.slot.peek().map(|a| a.id) != Some(decision) {
            return Ok(None);
        }
        let snapshot = self.snapshot.current()?;
        self.apply_default(&mut state, &snapshot, policy).map(Some)
    }

    /// Returns at most `max_chars` characters from the end of the log.
    /// Zero returns everything.
    pub fn log_tail(&self, max_chars: usize) -> Result<LogTail> {
        let total_chars = self.log.len();
        let log = self.log.tail(max_chars)?;
        let returned_chars = log.chars().count();
        Ok(LogTail {
            truncated: returned_chars < total_chars,
            log,
            total_chars,
            returned_chars,
        })
    }

    /// Sends a chat line through the engine session.
    pub fn send_chat(&self, text: &str) -> Result<()> {
        let chat = {
            let state = self.lock()?;
            self.ensure_open(&state)?;
            state.chat.ok_or(BridgeError::ChatUnavailable(self.id))?
        };
        self.session
            .chat(chat, text)
            .map_err(BridgeError::EngineDisconnected)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> Result<MutexGuard<'_, ContextState>> {
        self.state
            .lock()
            .map_err(|_| BridgeError::LockPoisoned { what: "context" })
    }

    fn ensure_open(&self, state: &ContextState) -> Result<()> {
        match &state.status {
            ContextStatus::Closed { reason } => Err(BridgeError::ContextClosed {
                context: self.id,
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn store_locked(
        &self,
        state: &mut ContextState,
        decision: Decision,
        prompt: &str,
    ) -> Result<DecisionId> {
        self.ensure_open(state)?;
        match state.slot.set(self.id, decision, prompt) {
            Ok(id) => {
                state.choices = None;
                debug!(context = %self.id, decision = %id, prompt, "decision stored");
                Ok(id)
            }
            Err(occupied) => {
                let detail = format!(
                    "new decision arrived while {} is still pending",
                    occupied.occupant
                );
                error!(context = %self.id, %detail, "engine protocol violation");
                self.close_locked(state, detail.clone());
                Err(BridgeError::ProtocolViolation {
                    context: self.id,
                    detail,
                })
            }
        }
    }

    /// Answers a pending mana payment from a tap source or a single pool
    /// colour. Anything else stays pending.
    fn pay_mana_locked(
        &self,
        state: &mut ContextState,
        snapshot: &GameSnapshot,
    ) -> Result<Option<AnswerReport>> {
        let Some(pending) = state.slot.peek() else {
            return Ok(None);
        };
        if !pending.decision.is_mana_payment() {
            return Ok(None);
        }
        let (answer, taken) = match mana::plan_payment(&pending.prompt, snapshot) {
            ManaPlan::Tap(source) => (
                EngineAnswer::Object(Some(source)),
                ActionTaken::TappedManaSource,
            ),
            ManaPlan::Spend(mana) => match snapshot.my_player_id {
                Some(player) => (
                    EngineAnswer::PoolMana { player, mana },
                    ActionTaken::SpentPoolMana,
                ),
                None => return Ok(None),
            },
            ManaPlan::Ambiguous(_) | ManaPlan::Unavailable { .. } => return Ok(None),
        };
        self.deliver(state, answer, Some(taken), snapshot).map(Some)
    }

    fn close_locked(&self, state: &mut ContextState, reason: String) {
        state.slot.take();
        state.choices = None;
        state.status = ContextStatus::Closed { reason };
        self.changed.notify_all();
    }

    fn apply_default(
        &self,
        state: &mut ContextState,
        snapshot: &GameSnapshot,
        policy: AmbiguityPolicy,
    ) -> Result<DefaultResolution> {
        let pending = state.slot.peek().ok_or(BridgeError::NoPendingAction)?;
        match default_answer_with(pending, snapshot, &state.failed, policy) {
            DefaultOutcome::NeedsManualChoice { reason } => {
                debug!(context = %self.id, decision = %pending.id, %reason, "default needs manual choice");
                Ok(DefaultResolution::NeedsManualChoice(ManualChoice {
                    decision_id: pending.id,
                    action_type: pending.kind(),
                    reason,
                }))
            }
            DefaultOutcome::Answer(default) => {
                let report =
                    self.deliver(state, default.answer, Some(default.taken), snapshot)?;
                if let Some(object) = default.record_failed {
                    state.failed.record(object);
                }
                info!(
                    context = %self.id,
                    decision = %report.decision_id,
                    action = %default.taken,
                    "resolved by default"
                );
                Ok(DefaultResolution::Answered(report))
            }
        }
    }

    /// Takes the pending decision and hands the answer to the engine while
    /// the context lock is held.
    fn deliver(
        &self,
        state: &mut ContextState,
        answer: EngineAnswer,
        taken: Option<ActionTaken>,
        snapshot: &GameSnapshot,
    ) -> Result<AnswerReport> {
        let action = state.slot.take().ok_or(BridgeError::NoPendingAction)?;
        state.choices = None;

        if let Err(err) = self.session.answer(self.id, action.id, &answer) {
            error!(context = %self.id, decision = %action.id, error = %err, "engine session failed");
            self.close_locked(state, format!("engine session failed: {err}"));
            return Err(BridgeError::EngineDisconnected(err));
        }
        debug!(context = %self.id, decision = %action.id, %answer, "answer sent");
        self.changed.notify_all();

        Ok(AnswerReport {
            decision_id: action.id,
            action_type: action.kind(),
            answer: describe_answer(&answer, snapshot),
            action_taken: taken,
        })
    }
}

/// Renders an answer for the agent without exposing engine identifiers.
fn describe_answer(answer: &EngineAnswer, snapshot: &GameSnapshot) -> String {
    match answer {
        EngineAnswer::Object(Some(id)) => snapshot
            .find_card(*id)
            .map(|(card, _)| card.name.clone())
            .or_else(|| snapshot.player_by_object(*id).map(|p| p.name.clone()))
            .unwrap_or_else(|| "selected object".to_string()),
        EngineAnswer::Object(None) => "none".to_string(),
        EngineAnswer::Text(Some(text)) => text.clone(),
        EngineAnswer::Text(None) => "none".to_string(),
        EngineAnswer::PoolMana { mana, .. } => format!("{} from mana pool", mana.label()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use decision_core::{CardView, ManaPool, ObjectId, PlayableObject, PlayerView, TargetRequest};

    use super::*;
    use crate::api::SessionError;

    #[derive(Default)]
    struct Recorder {
        answers: Mutex<Vec<(DecisionId, EngineAnswer)>>,
        fail: bool,
    }

    impl EngineSession for Recorder {
        fn answer(
            &self,
            _context: ContextId,
            decision: DecisionId,
            answer: &EngineAnswer,
        ) -> std::result::Result<(), SessionError> {
            if self.fail {
                return Err(SessionError::Closed);
            }
            self.answers.lock().unwrap().push((decision, answer.clone()));
            Ok(())
        }

        fn chat(&self, _chat: ChatId, _text: &str) -> std::result::Result<(), SessionError> {
            Ok(())
        }
    }

    fn context() -> (GameContext, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        (
            GameContext::new(ContextId::random(), recorder.clone()),
            recorder,
        )
    }

    #[test]
    fn test_protocol_violation_closes_context() {
        let (ctx, _) = context();
        ctx.store_decision(Decision::Select, "first").unwrap();
        let err = ctx.store_decision(Decision::Ask, "second").unwrap_err();
        assert!(matches!(err, BridgeError::ProtocolViolation { .. }));
        assert!(matches!(ctx.status().unwrap(), ContextStatus::Closed { .. }));
        assert!(matches!(
            ctx.pending(),
            Err(BridgeError::ContextClosed { .. })
        ));
    }

    #[test]
    fn test_input_error_keeps_decision_pending() {
        let (ctx, recorder) = context();
        let id = ctx.store_decision(Decision::Ask, "Keep hand?").unwrap();
        let err = ctx.choose(&ChoiceInput::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Choice(_)));
        assert_eq!(ctx.pending().unwrap().map(|p| p.decision_id), Some(id));
        assert!(recorder.answers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_choice_list_invalidated_by_answer() {
        let (ctx, _) = context();
        let a = ObjectId::random();
        let request = TargetRequest {
            required: true,
            targets: vec![a],
            ..TargetRequest::default()
        };
        ctx.store_decision(Decision::Target(request.clone()), "target")
            .unwrap();
        ctx.choices().unwrap();
        ctx.choose(&ChoiceInput::index(0)).unwrap();

        ctx.store_decision(Decision::Target(request), "target again")
            .unwrap();
        let err = ctx.choose(&ChoiceInput::index(0)).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Choice(decision_core::ChoiceError::NoChoiceList)
        ));
    }

    #[test]
    fn test_answer_report_uses_card_names() {
        let (ctx, recorder) = context();
        let me = PlayerId::random();
        let bear = ObjectId::random();
        let mut alice = PlayerView::new(me, "Alice", 20);
        alice.battlefield.push(CardView::new(bear, "Grizzly Bears"));
        ctx.update_snapshot(GameSnapshot {
            my_player_id: Some(me),
            players: vec![alice],
            playable: vec![PlayableObject::new(bear, ["Attack"])],
            ..GameSnapshot::default()
        })
        .unwrap();
        ctx.store_decision(Decision::Select, "priority").unwrap();
        ctx.choices().unwrap();
        let report = ctx.choose(&ChoiceInput::index(0)).unwrap();
        assert_eq!(report.answer, "Grizzly Bears");
        assert_eq!(
            recorder.answers.lock().unwrap()[0].1,
            EngineAnswer::Object(Some(bear))
        );
    }

    #[test]
    fn test_session_failure_tears_down_context() {
        let ctx = GameContext::new(
            ContextId::random(),
            Arc::new(Recorder {
                fail: true,
                ..Recorder::default()
            }),
        );
        ctx.store_decision(Decision::Select, "priority").unwrap();
        let err = ctx.take_default().unwrap_err();
        assert!(matches!(err, BridgeError::EngineDisconnected(_)));
        assert!(matches!(ctx.status().unwrap(), ContextStatus::Closed { .. }));
    }

    #[test]
    fn test_failed_payment_recorded_and_cleared_on_new_turn() {
        let (ctx, _) = context();
        let spell = ObjectId::random();
        ctx.update_snapshot(GameSnapshot {
            turn: 2,
            playable: vec![PlayableObject::new(spell, ["Cast Giant Growth"])],
            ..GameSnapshot::default()
        })
        .unwrap();

        ctx.store_decision(Decision::PlayMana, &format!("Pay {{G}} object_id='{spell}'"))
            .unwrap();
        ctx.take_default().unwrap();

        ctx.store_decision(Decision::Select, "priority").unwrap();
        let view = ctx.choices().unwrap();
        assert!(view.choices.is_empty());

        ctx.update_snapshot(GameSnapshot {
            turn: 3,
            playable: vec![PlayableObject::new(spell, ["Cast Giant Growth"])],
            ..GameSnapshot::default()
        })
        .unwrap();
        assert_eq!(ctx.choices().unwrap().choices.len(), 1);
    }

    #[test]
    fn test_auto_paid_mana_never_reaches_waiters() {
        let (ctx, recorder) = context();
        let ctx = Arc::new(ctx);
        let me = PlayerId::random();
        let mut alice = PlayerView::new(me, "Alice", 20);
        alice.mana_pool = ManaPool {
            green: 1,
            ..ManaPool::default()
        };
        ctx.update_snapshot(GameSnapshot {
            my_player_id: Some(me),
            players: vec![alice],
            ..GameSnapshot::default()
        })
        .unwrap();

        let waiter = {
            let ctx = ctx.clone();
            std::thread::spawn(move || ctx.wait_for_next(Duration::from_millis(200)).unwrap())
        };
        std::thread::sleep(Duration::from_millis(20));
        let stored = ctx.store_or_pay(Decision::PlayMana, "Pay {G}").unwrap();
        assert!(matches!(stored, Stored::Paid(_)));

        let report = waiter.join().unwrap();
        assert!(report.timed_out);
        assert!(!report.action_pending);
        assert_eq!(recorder.answers.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unpayable_mana_stays_pending() {
        let (ctx, recorder) = context();
        let stored = ctx.store_or_pay(Decision::PlayMana, "Pay {G}").unwrap();
        let Stored::Pending(id) = &stored else {
            panic!("expected the payment to stay pending, got {stored:?}");
        };
        assert_eq!(ctx.pending().unwrap().map(|p| p.decision_id), Some(*id));
        assert!(recorder.answers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_chat_requires_channel() {
        let (ctx, _) = context();
        assert!(matches!(
            ctx.send_chat("gl hf"),
            Err(BridgeError::ChatUnavailable(_))
        ));
        ctx.attach(None, Some(ChatId::random())).unwrap();
        ctx.send_chat("gl hf").unwrap();
    }
}
