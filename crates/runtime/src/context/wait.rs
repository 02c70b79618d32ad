//! Blocking operations: wait for a decision, pass priority, drain until
//! something happens.
//!
//! Each one is a guarded wait on the context condition variable. The
//! predicate is re-checked under the context mutex after every wake-up and
//! the caller's timeout is the only way to cancel.
use std::sync::MutexGuard;
use std::time::{Duration, Instant};

use decision_core::diff::{self, StateBaseline};
use decision_core::mana::is_mana_only;
use decision_core::{AmbiguityPolicy, DecisionKind, EngineAnswer, GameSnapshot};
use tracing::debug;

use super::{
    ContextState, ContextStatus, DefaultResolution, DrainReport, GameContext, PassReport,
    PendingSummary, WaitReport,
};
use crate::api::{BridgeError, Result};

impl GameContext {
    /// Blocks until a decision is pending or the timeout elapses.
    pub fn wait_for_next(&self, timeout: Duration) -> Result<WaitReport> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock()?;
        loop {
            self.ensure_open(&state)?;
            if let Some(pending) = state.slot.peek() {
                return Ok(WaitReport {
                    action_pending: true,
                    pending: Some(PendingSummary::from(pending)),
                    ..WaitReport::default()
                });
            }
            if matches!(state.status, ContextStatus::Finished { .. }) {
                return Ok(WaitReport {
                    game_over: true,
                    ..WaitReport::default()
                });
            }
            state = match self.wait_until(state, deadline)? {
                Some(state) => state,
                None => {
                    return Ok(WaitReport {
                        timed_out: true,
                        ..WaitReport::default()
                    });
                }
            };
        }
    }

    /// Passes priority for as long as nothing worth playing is available.
    ///
    /// Returns when a priority decision offers a playable object, when any
    /// other kind of decision arrives, or on timeout.
    pub fn pass_priority(&self, timeout: Duration) -> Result<PassReport> {
        let deadline = Instant::now() + timeout;
        let mut passed = 0u32;
        let mut state = self.lock()?;
        loop {
            self.ensure_open(&state)?;
            if matches!(state.status, ContextStatus::Finished { .. }) {
                return Ok(PassReport {
                    actions_passed: passed,
                    game_over: true,
                    ..PassReport::default()
                });
            }

            if let Some(pending) = state.slot.peek() {
                let summary = PendingSummary::from(pending);
                if pending.kind() != DecisionKind::Select {
                    return Ok(PassReport {
                        action_pending: true,
                        pending: Some(summary),
                        actions_passed: passed,
                        ..PassReport::default()
                    });
                }
                let snapshot = self.snapshot.current()?;
                if has_playable(&snapshot, &state) {
                    return Ok(PassReport {
                        action_pending: true,
                        pending: Some(summary),
                        has_playable_cards: true,
                        actions_passed: passed,
                        ..PassReport::default()
                    });
                }
                self.deliver(&mut state, EngineAnswer::Boolean(false), None, &snapshot)?;
                passed += 1;
                continue;
            }

            state = match self.wait_until(state, deadline)? {
                Some(state) => state,
                None => {
                    debug!(context = %self.id, passed, "pass_priority timed out");
                    return Ok(PassReport {
                        actions_passed: passed,
                        timed_out: true,
                        ..PassReport::default()
                    });
                }
            };
        }
    }

    /// Auto-resolves decisions until the game state or the log changes.
    ///
    /// Returns a textual diff as soon as turn, life totals, battlefield sizes,
    /// or graveyard sizes differ from the state at entry; returns the new log
    /// once it grew by `min_new_chars`; stops at the first decision whose
    /// default needs a manual choice. On timeout it returns a state summary.
    /// A zero timeout returns the summary without resolving anything.
    pub fn drain_until_event(&self, min_new_chars: usize, timeout: Duration) -> Result<DrainReport> {
        let deadline = Instant::now() + timeout;
        let start_len = self.log.len();
        let baseline = self.snapshot.latest()?.map(|s| StateBaseline::capture(&s));
        let mut taken = 0u32;

        if timeout.is_zero() {
            return self.drain_summary(start_len, taken);
        }

        let mut state = self.lock()?;
        loop {
            self.ensure_open(&state)?;
            if let ContextStatus::Finished { message } = &state.status {
                let mut new_log = self.log.since(start_len)?;
                if !new_log.is_empty() {
                    new_log.push('\n');
                }
                new_log.push_str(&format!("Game over: {message}"));
                return Ok(DrainReport {
                    event_occurred: true,
                    new_chars: new_log.chars().count(),
                    new_log,
                    actions_taken: taken,
                    game_over: true,
                    ..DrainReport::default()
                });
            }

            let snapshot = self.snapshot.current()?;
            if !state.slot.is_empty() {
                match self.apply_default(&mut state, &snapshot, AmbiguityPolicy::Manual)? {
                    DefaultResolution::Answered(_) => taken += 1,
                    DefaultResolution::NeedsManualChoice(manual) => {
                        return Ok(DrainReport {
                            new_log: self.log.since(start_len)?,
                            new_chars: self.log.len().saturating_sub(start_len),
                            actions_taken: taken,
                            needs_manual_choice: Some(manual),
                            ..DrainReport::default()
                        });
                    }
                }
            }

            let latest = self.snapshot.latest()?;
            if let (Some(baseline), Some(latest)) = (&baseline, &latest) {
                if let Some(changes) = baseline.describe_changes(latest) {
                    return Ok(DrainReport {
                        event_occurred: true,
                        new_chars: changes.chars().count(),
                        new_log: changes,
                        actions_taken: taken,
                        ..DrainReport::default()
                    });
                }
            }

            let grown = self.log.len().saturating_sub(start_len);
            if grown >= min_new_chars {
                return Ok(DrainReport {
                    event_occurred: true,
                    new_log: self.log.since(start_len)?,
                    new_chars: grown,
                    actions_taken: taken,
                    ..DrainReport::default()
                });
            }

            state = match self.wait_until(state, deadline)? {
                Some(state) => state,
                None => return self.drain_summary(start_len, taken),
            };
        }
    }

    fn drain_summary(&self, start_len: usize, taken: u32) -> Result<DrainReport> {
        let summary = self
            .snapshot
            .latest()?
            .map(|s| diff::summary(&s))
            .unwrap_or_default();
        let new_log = format!("{summary}{}", self.log.since(start_len)?);
        Ok(DrainReport {
            event_occurred: !new_log.is_empty(),
            new_chars: new_log.chars().count(),
            new_log,
            actions_taken: taken,
            timed_out: true,
            ..DrainReport::default()
        })
    }

    /// Waits for a notification until `deadline`.
    ///
    /// Returns `None` once the deadline has passed.
    fn wait_until<'a>(
        &'a self,
        state: MutexGuard<'a, ContextState>,
        deadline: Instant,
    ) -> Result<Option<MutexGuard<'a, ContextState>>> {
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let (state, _) = self
            .changed
            .wait_timeout(state, deadline - now)
            .map_err(|_| BridgeError::LockPoisoned { what: "context" })?;
        Ok(Some(state))
    }
}

/// True when the priority decision offers something other than a mana-only
/// object or a payment that already failed this turn.
fn has_playable(snapshot: &GameSnapshot, state: &ContextState) -> bool {
    snapshot
        .playable
        .iter()
        .any(|obj| !state.failed.contains(obj.id) && !is_mana_only(&obj.abilities))
}
