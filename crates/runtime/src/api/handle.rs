//! Cloneable façade for agent-side operations.
//!
//! [`BridgeHandle`] addresses the current game context. Operations that block
//! (`wait_for_next`, `pass_priority`, `drain_until_event`) park the calling
//! thread; async callers should run them on a blocking pool.
use std::sync::Arc;
use std::time::{Duration, Instant};

use decision_core::{ChoiceInput, ChoicesView, GameSnapshot, GameStateView};
use tokio::sync::mpsc;

use super::errors::{BridgeError, Result};
use crate::config::Timeouts;
use crate::context::{
    AnswerReport, DefaultResolution, DrainReport, GameContext, LogTail, PassReport,
    PendingSummary, WaitReport,
};
use crate::events::EngineEvent;
use crate::oracle::{self, CardLookup, CardOracle};
use crate::registry::ContextRegistry;

/// Client-facing handle to the bridge.
#[derive(Clone)]
pub struct BridgeHandle {
    registry: Arc<ContextRegistry>,
    oracle: Arc<dyn CardOracle>,
    timeouts: Timeouts,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl BridgeHandle {
    pub(crate) fn new(
        registry: Arc<ContextRegistry>,
        oracle: Arc<dyn CardOracle>,
        timeouts: Timeouts,
        event_tx: mpsc::Sender<EngineEvent>,
    ) -> Self {
        Self {
            registry,
            oracle,
            timeouts,
            event_tx,
        }
    }

    /// Default timeouts from configuration.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Feeds an engine notification into the ingest worker.
    pub async fn submit(&self, event: EngineEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| BridgeError::IngestChannelClosed)
    }

    /// Sender half of the ingest channel, for engine links.
    pub fn events(&self) -> mpsc::Sender<EngineEvent> {
        self.event_tx.clone()
    }

    pub fn current(&self) -> Result<Arc<GameContext>> {
        self.registry.current()
    }

    pub fn is_pending(&self) -> Result<Option<PendingSummary>> {
        self.current()?.pending()
    }

    pub fn get_choices(&self) -> Result<ChoicesView> {
        self.current()?.choices()
    }

    pub fn choose(&self, input: &ChoiceInput) -> Result<AnswerReport> {
        self.current()?.choose(input)
    }

    pub fn take_default(&self) -> Result<DefaultResolution> {
        self.current()?.take_default()
    }

    /// Blocks until a decision is pending. Waits for a game to start first
    /// when none is running yet.
    pub fn wait_for_next(&self, timeout: Option<Duration>) -> Result<WaitReport> {
        let timeout = timeout.unwrap_or(self.timeouts.wait);
        let deadline = Instant::now() + timeout;
        match self.wait_context(timeout)? {
            Some(ctx) => ctx.wait_for_next(remaining(deadline)),
            None => Ok(WaitReport {
                timed_out: true,
                ..WaitReport::default()
            }),
        }
    }

    pub fn pass_priority(&self, timeout: Option<Duration>) -> Result<PassReport> {
        let timeout = timeout.unwrap_or(self.timeouts.pass);
        let deadline = Instant::now() + timeout;
        match self.wait_context(timeout)? {
            Some(ctx) => ctx.pass_priority(remaining(deadline)),
            None => Ok(PassReport {
                timed_out: true,
                ..PassReport::default()
            }),
        }
    }

    pub fn drain_until_event(
        &self,
        min_new_chars: Option<usize>,
        timeout: Option<Duration>,
    ) -> Result<DrainReport> {
        let min_new_chars = min_new_chars.unwrap_or(self.timeouts.drain_min_chars);
        let timeout = timeout.unwrap_or(self.timeouts.drain);
        let deadline = Instant::now() + timeout;
        match self.wait_context(timeout)? {
            Some(ctx) => ctx.drain_until_event(min_new_chars, remaining(deadline)),
            None => Ok(DrainReport {
                timed_out: true,
                ..DrainReport::default()
            }),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<GameSnapshot>> {
        self.current()?.snapshots().current()
    }

    /// Current game state as the agent sees it, without engine identifiers.
    pub fn game_state(&self) -> Result<GameStateView> {
        Ok(GameStateView::from(self.snapshot()?.as_ref()))
    }

    pub fn log_tail(&self, max_chars: usize) -> Result<LogTail> {
        self.current()?.log_tail(max_chars)
    }

    pub fn send_chat(&self, text: &str) -> Result<()> {
        self.current()?.send_chat(text)
    }

    /// Looks a card up by name in the running game, then in the card oracle.
    pub async fn lookup_card(&self, name: &str) -> Result<Option<CardLookup>> {
        let snapshot = match self.registry.current() {
            Ok(ctx) => ctx.snapshots().latest()?,
            Err(BridgeError::NoActiveContext) => None,
            Err(err) => return Err(err),
        };
        Ok(oracle::lookup(snapshot.as_deref(), self.oracle.as_ref(), name).await)
    }

    fn wait_context(&self, timeout: Duration) -> Result<Option<Arc<GameContext>>> {
        match self.registry.wait_current(timeout) {
            Ok(ctx) => Ok(Some(ctx)),
            Err(BridgeError::NoActiveContext) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}
