//! Snapshot comparison used by the drain loop.
use std::fmt::Write as _;

use crate::snapshot::GameSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
struct PlayerCounts {
    name: String,
    life: i32,
    battlefield: usize,
    graveyard: usize,
}

/// The parts of a snapshot a drain compares against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBaseline {
    turn: u32,
    players: Vec<PlayerCounts>,
}

impl StateBaseline {
    pub fn capture(snapshot: &GameSnapshot) -> Self {
        Self {
            turn: snapshot.turn,
            players: snapshot
                .players
                .iter()
                .map(|p| PlayerCounts {
                    name: p.name.clone(),
                    life: p.life,
                    battlefield: p.battlefield.len(),
                    graveyard: p.graveyard.len(),
                })
                .collect(),
        }
    }

    fn player(&self, name: &str) -> Option<&PlayerCounts> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Describes what changed since the baseline, or `None` when turn, life
    /// totals, battlefield sizes, and graveyard sizes all match.
    pub fn describe_changes(&self, current: &GameSnapshot) -> Option<String> {
        let mut out = String::new();

        if current.turn != self.turn {
            let _ = writeln!(out, "Turn {} ({}'s turn)", current.turn, current.active_player);
        }

        for player in &current.players {
            let Some(start) = self.player(&player.name) else {
                continue;
            };
            if start.life != player.life {
                let _ = writeln!(
                    out,
                    "{}: {} -> {} life ({})",
                    player.name,
                    start.life,
                    player.life,
                    signed(player.life as i64 - start.life as i64)
                );
            }
        }

        for player in &current.players {
            let before = self.player(&player.name).map_or(0, |p| p.battlefield);
            let now = player.battlefield.len();
            if before != now {
                let _ = writeln!(
                    out,
                    "{}: {} permanents ({now} total)",
                    player.name,
                    signed(now as i64 - before as i64)
                );
            }
        }

        for player in &current.players {
            let before = self.player(&player.name).map_or(0, |p| p.graveyard);
            let now = player.graveyard.len();
            if before != now {
                let _ = writeln!(
                    out,
                    "{}'s graveyard: {} cards ({now} total)",
                    player.name,
                    signed(now as i64 - before as i64)
                );
            }
        }

        if out.is_empty() {
            return None;
        }
        let _ = writeln!(out, "Phase: {}", phase_label(current));
        Some(out)
    }
}

/// Short textual summary used when a drain times out.
pub fn summary(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Turn {}, {}, {}'s turn",
        snapshot.turn,
        phase_label(snapshot),
        snapshot.active_player
    );
    for player in &snapshot.players {
        let _ = writeln!(
            out,
            "{}: {} life, {} permanents",
            player.name,
            player.life,
            player.battlefield.len()
        );
    }
    out
}

fn phase_label(snapshot: &GameSnapshot) -> String {
    if snapshot.step.is_empty() {
        snapshot.phase.clone()
    } else {
        format!("{} - {}", snapshot.phase, snapshot.step)
    }
}

fn signed(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ObjectId, PlayerId};
    use crate::snapshot::{CardView, PlayerView};

    fn two_players(alice: i32, bob: i32) -> GameSnapshot {
        GameSnapshot {
            turn: 4,
            phase: "COMBAT".into(),
            step: "COMBAT_DAMAGE".into(),
            active_player: "Alice".into(),
            players: vec![
                PlayerView::new(PlayerId::random(), "Alice", alice),
                PlayerView::new(PlayerId::random(), "Bob", bob),
            ],
            ..GameSnapshot::default()
        }
    }

    #[test]
    fn test_unchanged_snapshot_has_no_diff() {
        let snapshot = two_players(20, 20);
        assert_eq!(StateBaseline::capture(&snapshot).describe_changes(&snapshot), None);
    }

    #[test]
    fn test_life_loss_is_reported() {
        let baseline = StateBaseline::capture(&two_players(20, 20));
        let diff = baseline.describe_changes(&two_players(20, 17)).unwrap();
        assert_eq!(diff, "Bob: 20 -> 17 life (-3)\nPhase: COMBAT - COMBAT_DAMAGE\n");
    }

    #[test]
    fn test_turn_and_zone_counts_are_reported() {
        let baseline = StateBaseline::capture(&two_players(20, 20));
        let mut next = two_players(20, 20);
        next.turn = 5;
        next.active_player = "Bob".into();
        next.players[0]
            .battlefield
            .push(CardView::new(ObjectId::random(), "Forest"));
        next.players[1]
            .graveyard
            .push(CardView::new(ObjectId::random(), "Shock"));

        let diff = baseline.describe_changes(&next).unwrap();
        assert!(diff.starts_with("Turn 5 (Bob's turn)\n"));
        assert!(diff.contains("Alice: +1 permanents (1 total)\n"));
        assert!(diff.contains("Bob's graveyard: +1 cards (1 total)\n"));
    }

    #[test]
    fn test_summary_lists_players() {
        let text = summary(&two_players(18, 20));
        assert_eq!(
            text,
            "Turn 4, COMBAT - COMBAT_DAMAGE, Alice's turn\nAlice: 18 life, 0 permanents\nBob: 20 life, 0 permanents\n"
        );
    }
}
