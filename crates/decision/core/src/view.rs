//! Agent-facing rendering of a [`GameSnapshot`].
//!
//! Engine identifiers stay behind: players are marked with `is_you`, cards
//! and playable objects are named. The only way to address an object is an
//! index from a choice list.
use std::collections::BTreeMap;

use crate::mana::ManaPool;
use crate::snapshot::{CardView, GameSnapshot, PlayerView};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardState {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub mana_cost: String,
    pub mana_value: u32,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub type_line: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub power_toughness: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub loyalty: Option<String>,
    pub tapped: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub controller: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub rules: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub counters: BTreeMap<String, u32>,
}

impl From<&CardView> for CardState {
    fn from(card: &CardView) -> Self {
        Self {
            name: card.name.clone(),
            mana_cost: card.mana_cost.clone(),
            mana_value: card.mana_value,
            type_line: card.type_line.clone(),
            power_toughness: card.pt(),
            loyalty: card.loyalty.clone(),
            tapped: card.tapped,
            controller: card.controller.clone(),
            rules: card.rules.clone(),
            counters: card.counters.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlayerState {
    pub name: String,
    pub life: i32,
    pub is_you: bool,
    pub is_active: bool,
    pub has_left: bool,
    pub library_count: u32,
    pub hand_count: u32,
    pub battlefield: Vec<CardState>,
    pub graveyard: Vec<CardState>,
    pub exile: Vec<CardState>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "BTreeMap::is_empty"))]
    pub counters: BTreeMap<String, u32>,
    pub mana_pool: ManaPool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub commanders: Vec<String>,
}

impl PlayerState {
    fn new(player: &PlayerView, is_you: bool) -> Self {
        let cards = |cards: &[CardView]| -> Vec<CardState> {
            cards.iter().map(CardState::from).collect()
        };
        Self {
            name: player.name.clone(),
            life: player.life,
            is_you,
            is_active: player.is_active,
            has_left: player.has_left,
            library_count: player.library_count,
            hand_count: player.hand_count,
            battlefield: cards(&player.battlefield),
            graveyard: cards(&player.graveyard),
            exile: cards(&player.exile),
            counters: player.counters.clone(),
            mana_pool: player.mana_pool,
            commanders: player.commanders.clone(),
        }
    }
}

/// A playable object by name, with the abilities the engine allows now.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlayableState {
    pub name: String,
    pub abilities: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GameStateView {
    pub turn: u32,
    pub phase: String,
    pub step: String,
    pub active_player: String,
    pub priority_player: String,
    pub players: Vec<PlayerState>,
    pub your_hand: Vec<CardState>,
    pub stack: Vec<CardState>,
    pub playable: Vec<PlayableState>,
}

impl From<&GameSnapshot> for GameStateView {
    fn from(snapshot: &GameSnapshot) -> Self {
        Self {
            turn: snapshot.turn,
            phase: snapshot.phase.clone(),
            step: snapshot.step.clone(),
            active_player: snapshot.active_player.clone(),
            priority_player: snapshot.priority_player.clone(),
            players: snapshot
                .players
                .iter()
                .map(|p| PlayerState::new(p, snapshot.is_me(p)))
                .collect(),
            your_hand: snapshot.hand.iter().map(CardState::from).collect(),
            stack: snapshot.stack.iter().map(CardState::from).collect(),
            playable: snapshot
                .playable
                .iter()
                .map(|obj| PlayableState {
                    name: snapshot
                        .find_card(obj.id)
                        .map(|(card, _)| card.name.clone())
                        .unwrap_or_else(|| "unknown object".to_string()),
                    abilities: obj.abilities.clone(),
                })
                .collect(),
        }
    }
}
