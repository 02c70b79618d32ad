//! Notifications pushed by the engine.
//!
//! The engine side writes these into the ingest channel; the ingest worker is
//! the only consumer. Decision-shaped events obligate exactly one answer.
use decision_core::{ChatId, ContextId, Decision, GameSnapshot, PlayerId};
use serde::{Deserialize, Serialize};

/// Category of a chat line. Only game lines feed the game log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    #[default]
    Game,
    Talk,
    Whisper,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    GameStarted {
        context: ContextId,
        #[serde(default)]
        player: Option<PlayerId>,
        #[serde(default)]
        chat: Option<ChatId>,
    },
    StateUpdated {
        context: ContextId,
        snapshot: GameSnapshot,
    },
    /// Informational message, optionally with fresh state.
    Inform {
        context: ContextId,
        message: String,
        #[serde(default)]
        snapshot: Option<GameSnapshot>,
    },
    Decision {
        context: ContextId,
        #[serde(default)]
        prompt: String,
        decision: Decision,
        #[serde(default)]
        snapshot: Option<GameSnapshot>,
    },
    Chat {
        context: ContextId,
        #[serde(default)]
        kind: ChatKind,
        text: String,
    },
    GameOver {
        context: ContextId,
        #[serde(default)]
        message: String,
    },
}

impl EngineEvent {
    pub fn context(&self) -> ContextId {
        match self {
            EngineEvent::GameStarted { context, .. }
            | EngineEvent::StateUpdated { context, .. }
            | EngineEvent::Inform { context, .. }
            | EngineEvent::Decision { context, .. }
            | EngineEvent::Chat { context, .. }
            | EngineEvent::GameOver { context, .. } => *context,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngineEvent::GameStarted { .. } => "game_started",
            EngineEvent::StateUpdated { .. } => "state_updated",
            EngineEvent::Inform { .. } => "inform",
            EngineEvent::Decision { .. } => "decision",
            EngineEvent::Chat { .. } => "chat",
            EngineEvent::GameOver { .. } => "game_over",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_event_parses_from_json_line() {
        let line = r#"{"event":"decision","context":"6f1c1c3e-3a47-4b5b-9a7e-1f2d3c4b5a69","prompt":"Pay {G}","decision":{"kind":"play_mana"}}"#;
        let event: EngineEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.label(), "decision");
        assert!(matches!(
            event,
            EngineEvent::Decision {
                decision: Decision::PlayMana,
                snapshot: None,
                ..
            }
        ));
    }

    #[test]
    fn test_chat_kind_defaults_to_game() {
        let line = r#"{"event":"chat","context":"6f1c1c3e-3a47-4b5b-9a7e-1f2d3c4b5a69","text":"Alice casts Shock"}"#;
        let event: EngineEvent = serde_json::from_str(line).unwrap();
        assert!(matches!(event, EngineEvent::Chat { kind: ChatKind::Game, .. }));
    }
}
