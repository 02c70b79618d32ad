//! Ingest worker that applies engine notifications to game contexts.
//!
//! Receives [`EngineEvent`]s from the engine link, routes each to its context
//! through the [`ContextRegistry`], and applies the configured answering mode.
use std::sync::Arc;

use decision_core::{AmbiguityPolicy, Decision, GameSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::Result;
use crate::config::{BridgeConfig, BridgeMode};
use crate::context::{DefaultResolution, GameContext, Stored};
use crate::events::{ChatKind, EngineEvent};
use crate::registry::ContextRegistry;

/// Background task that owns the producer side of every context.
pub struct IngestWorker {
    registry: Arc<ContextRegistry>,
    config: BridgeConfig,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl IngestWorker {
    pub fn new(
        registry: Arc<ContextRegistry>,
        config: BridgeConfig,
        event_rx: mpsc::Receiver<EngineEvent>,
    ) -> Self {
        Self {
            registry,
            config,
            event_rx,
        }
    }

    /// Main worker loop. Ends once every sender is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    let context = event.context();
                    let label = event.label();
                    if let Err(err) = self.handle_event(event) {
                        if err.is_fatal() {
                            error!(%context, event = label, error = %err, "event handling failed");
                        } else {
                            warn!(%context, event = label, error = %err, "event ignored");
                        }
                    }
                }
                else => break,
            }
        }
        debug!("ingest worker stopped");
    }

    fn handle_event(&self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::GameStarted {
                context,
                player,
                chat,
            } => {
                let ctx = self.registry.set_current(context)?;
                ctx.attach(player, chat)?;
                info!(%context, "game started");
            }
            EngineEvent::StateUpdated { context, snapshot } => {
                let ctx = self.registry.get_or_create(context)?;
                self.apply_snapshot(&ctx, snapshot)?;
            }
            EngineEvent::Inform {
                context,
                message,
                snapshot,
            } => {
                let ctx = self.registry.get_or_create(context)?;
                if let Some(snapshot) = snapshot {
                    self.apply_snapshot(&ctx, snapshot)?;
                }
                debug!(%context, %message, "engine inform");
            }
            EngineEvent::Decision {
                context,
                prompt,
                decision,
                snapshot,
            } => {
                let ctx = self.registry.get_or_create(context)?;
                if let Some(snapshot) = snapshot {
                    self.apply_snapshot(&ctx, snapshot)?;
                }
                self.dispatch(ctx, decision, &prompt)?;
            }
            EngineEvent::Chat {
                context,
                kind,
                text,
            } => {
                if kind == ChatKind::Game {
                    self.registry.get_or_create(context)?.append_log(&text)?;
                } else {
                    debug!(%context, ?kind, %text, "chat message");
                }
            }
            EngineEvent::GameOver { context, message } => {
                self.registry.get_or_create(context)?.finish(&message)?;
                self.registry.retire(context)?;
            }
        }
        Ok(())
    }

    /// Stores a snapshot, identifying our seat by name when the engine
    /// did not say which player we are.
    fn apply_snapshot(&self, ctx: &GameContext, snapshot: GameSnapshot) -> Result<()> {
        if snapshot.my_player_id.is_none() && ctx.player()?.is_none() {
            if let Some(name) = &self.config.player_name {
                let seat = snapshot
                    .players
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                    .map(|p| p.id);
                if seat.is_some() {
                    ctx.attach(seat, None)?;
                }
            }
        }
        ctx.update_snapshot(snapshot)
    }

    /// Stores a decision and applies the answering mode to it.
    fn dispatch(&self, ctx: Arc<GameContext>, decision: Decision, prompt: &str) -> Result<()> {
        match self.config.mode {
            BridgeMode::Manual => {
                if !self.config.auto_pay_mana {
                    ctx.store_decision(decision, prompt)?;
                    return Ok(());
                }
                if let Stored::Paid(report) = ctx.store_or_pay(decision, prompt)? {
                    info!(
                        context = %ctx.id(),
                        decision = %report.decision_id,
                        answer = %report.answer,
                        "mana paid automatically"
                    );
                }
            }
            BridgeMode::Autopilot => {
                let id = ctx.store_decision(decision, prompt)?;
                let delay = self.config.autopilot_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    match ctx.take_default_if(id, AmbiguityPolicy::FirstAvailable) {
                        Ok(Some(DefaultResolution::NeedsManualChoice(manual))) => {
                            warn!(context = %ctx.id(), decision = %id, reason = %manual.reason, "autopilot left decision pending");
                        }
                        Ok(_) => {}
                        Err(err) => {
                            warn!(context = %ctx.id(), decision = %id, error = %err, "autopilot failed");
                        }
                    }
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use decision_core::{ContextId, Decision, ManaPool, PlayerId, PlayerView};

    use super::*;
    use crate::api::{ChannelSession, Outbound};

    fn worker(config: BridgeConfig) -> (
        Arc<ContextRegistry>,
        mpsc::Sender<EngineEvent>,
        mpsc::UnboundedReceiver<Outbound>,
        tokio::task::JoinHandle<()>,
    ) {
        let (session, outbound) = ChannelSession::new();
        let registry = Arc::new(ContextRegistry::new(Arc::new(session)));
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(IngestWorker::new(registry.clone(), config, rx).run());
        (registry, tx, outbound, handle)
    }

    #[tokio::test]
    async fn test_events_reach_context() {
        let (registry, tx, _outbound, handle) = worker(BridgeConfig::default());
        let context = ContextId::random();
        tx.send(EngineEvent::GameStarted {
            context,
            player: None,
            chat: None,
        })
        .await
        .unwrap();
        tx.send(EngineEvent::Chat {
            context,
            kind: ChatKind::Game,
            text: "Alice plays Forest".into(),
        })
        .await
        .unwrap();
        tx.send(EngineEvent::Chat {
            context,
            kind: ChatKind::Talk,
            text: "gl hf".into(),
        })
        .await
        .unwrap();
        tx.send(EngineEvent::Decision {
            context,
            prompt: "Keep hand?".into(),
            decision: Decision::Ask,
            snapshot: None,
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let ctx = registry.current().unwrap();
        assert_eq!(ctx.id(), context);
        assert_eq!(ctx.log().tail(0).unwrap(), "Alice plays Forest");
        assert!(ctx.pending().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_finished_games_are_released() {
        let (registry, tx, _outbound, handle) = worker(BridgeConfig::default());
        let mut last = None;
        for _ in 0..3 {
            let context = ContextId::random();
            tx.send(EngineEvent::GameStarted {
                context,
                player: None,
                chat: None,
            })
            .await
            .unwrap();
            tx.send(EngineEvent::GameOver {
                context,
                message: "Alice won".into(),
            })
            .await
            .unwrap();
            last = Some(context);
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(registry.len(), 1);
        let ctx = registry.current().unwrap();
        assert_eq!(Some(ctx.id()), last);
        assert!(ctx.wait_for_next(Duration::ZERO).unwrap().game_over);
    }

    #[tokio::test]
    async fn test_manual_mode_pays_single_pool_colour() {
        let (registry, tx, mut outbound, handle) = worker(BridgeConfig::default());
        let context = ContextId::random();
        let me = PlayerId::random();
        let mut alice = PlayerView::new(me, "Alice", 20);
        alice.mana_pool = ManaPool {
            green: 1,
            ..ManaPool::default()
        };
        tx.send(EngineEvent::Decision {
            context,
            prompt: "Pay {G}".into(),
            decision: Decision::PlayMana,
            snapshot: Some(GameSnapshot {
                my_player_id: Some(me),
                players: vec![alice],
                ..GameSnapshot::default()
            }),
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(matches!(
            outbound.recv().await,
            Some(Outbound::Answer { .. })
        ));
        assert!(registry.current().unwrap().pending().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_autopilot_answers_after_delay() {
        let config = BridgeConfig {
            mode: BridgeMode::Autopilot,
            autopilot_delay: Duration::from_millis(10),
            ..BridgeConfig::default()
        };
        let (registry, tx, mut outbound, handle) = worker(config);
        tx.send(EngineEvent::Decision {
            context: ContextId::random(),
            prompt: "priority".into(),
            decision: Decision::Select,
            snapshot: None,
        })
        .await
        .unwrap();

        let sent = tokio::time::timeout(Duration::from_secs(5), outbound.recv())
            .await
            .unwrap();
        assert!(matches!(sent, Some(Outbound::Answer { .. })));
        assert!(registry.current().unwrap().pending().unwrap().is_none());
        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_player_name_identifies_seat() {
        let config = BridgeConfig {
            player_name: Some("alice".into()),
            ..BridgeConfig::default()
        };
        let (registry, tx, _outbound, handle) = worker(config);
        let me = PlayerId::random();
        tx.send(EngineEvent::StateUpdated {
            context: ContextId::random(),
            snapshot: GameSnapshot {
                players: vec![
                    PlayerView::new(PlayerId::random(), "Bob", 20),
                    PlayerView::new(me, "Alice", 20),
                ],
                ..GameSnapshot::default()
            },
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let ctx = registry.current().unwrap();
        assert_eq!(ctx.player().unwrap(), Some(me));
        let snapshot = ctx.snapshots().current().unwrap();
        assert_eq!(snapshot.my_player_id, Some(me));
    }
}
