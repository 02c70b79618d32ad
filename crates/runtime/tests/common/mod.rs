#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bridge_runtime::{EngineSession, GameContext, SessionError};
use decision_core::{
    CardView, ChatId, ContextId, DecisionId, EngineAnswer, GameSnapshot, ObjectId, PlayerId,
    PlayerView,
};

/// Engine session double that records every answer it is handed.
#[derive(Default)]
pub struct Recorder {
    answers: Mutex<Vec<(DecisionId, EngineAnswer)>>,
    chats: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn answers(&self) -> Vec<(DecisionId, EngineAnswer)> {
        self.answers.lock().unwrap().clone()
    }

    pub fn answer_count(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    pub fn chats(&self) -> Vec<String> {
        self.chats.lock().unwrap().clone()
    }
}

impl EngineSession for Recorder {
    fn answer(
        &self,
        _context: ContextId,
        decision: DecisionId,
        answer: &EngineAnswer,
    ) -> Result<(), SessionError> {
        self.answers.lock().unwrap().push((decision, answer.clone()));
        Ok(())
    }

    fn chat(&self, _chat: ChatId, text: &str) -> Result<(), SessionError> {
        self.chats.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn context() -> (Arc<GameContext>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let ctx = Arc::new(GameContext::new(ContextId::random(), recorder.clone()));
    (ctx, recorder)
}

/// Two-player table: Alice (us) and Bob, both at the given life totals.
pub struct Table {
    pub alice: PlayerId,
    pub bob: PlayerId,
    pub snapshot: GameSnapshot,
}

pub fn table(alice_life: i32, bob_life: i32) -> Table {
    let alice = PlayerId::random();
    let bob = PlayerId::random();
    let snapshot = GameSnapshot {
        turn: 4,
        phase: "PRECOMBAT_MAIN".into(),
        step: "PRECOMBAT_MAIN".into(),
        active_player: "Alice".into(),
        priority_player: "Alice".into(),
        my_player_id: Some(alice),
        players: vec![
            PlayerView::new(alice, "Alice", alice_life),
            PlayerView::new(bob, "Bob", bob_life),
        ],
        ..GameSnapshot::default()
    };
    Table {
        alice,
        bob,
        snapshot,
    }
}

impl Table {
    pub fn with_bob_creatures(mut self, names: &[&str]) -> (Self, Vec<ObjectId>) {
        let mut ids = Vec::new();
        for name in names {
            let id = ObjectId::random();
            self.snapshot.players[1].battlefield.push(
                CardView::new(id, *name)
                    .with_pt("2", "2")
                    .with_controller("Bob"),
            );
            ids.push(id);
        }
        (self, ids)
    }
}
