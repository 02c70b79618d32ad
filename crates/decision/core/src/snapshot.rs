//! Structured game state pushed by the engine.
//!
//! A [`GameSnapshot`] is replaced wholesale on every engine update and may be
//! stale between updates. Nothing in this module mutates a snapshot in place.
use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::ids::{ObjectId, PlayerId};
use crate::mana::ManaPool;

bitflags! {
    /// Card types printed on the type line.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CardTypes: u16 {
        const LAND         = 1 << 0;
        const CREATURE     = 1 << 1;
        const ARTIFACT     = 1 << 2;
        const ENCHANTMENT  = 1 << 3;
        const PLANESWALKER = 1 << 4;
        const INSTANT      = 1 << 5;
        const SORCERY      = 1 << 6;
        const BATTLE       = 1 << 7;
        const KINDRED      = 1 << 8;
    }
}

/// Where a card was found when searching a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Zone {
    Hand,
    Stack,
    Battlefield,
    Graveyard,
    Exile,
}

/// Agent-visible view of a single card or permanent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardView {
    pub id: ObjectId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_cost: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_value: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub types: CardTypes,
    #[cfg_attr(feature = "serde", serde(default))]
    pub type_line: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub toughness: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub loyalty: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tapped: bool,
    /// Name of the controlling player, when the engine reports it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub controller: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rules: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counters: BTreeMap<String, u32>,
}

impl CardView {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mana_cost: String::new(),
            mana_value: 0,
            types: CardTypes::empty(),
            type_line: String::new(),
            power: None,
            toughness: None,
            loyalty: None,
            tapped: false,
            controller: None,
            rules: Vec::new(),
            counters: BTreeMap::new(),
        }
    }

    pub fn with_cost(mut self, mana_cost: impl Into<String>, mana_value: u32) -> Self {
        self.mana_cost = mana_cost.into();
        self.mana_value = mana_value;
        self
    }

    pub fn with_types(mut self, types: CardTypes) -> Self {
        self.types = types;
        self
    }

    pub fn with_pt(mut self, power: impl Into<String>, toughness: impl Into<String>) -> Self {
        self.power = Some(power.into());
        self.toughness = Some(toughness.into());
        self
    }

    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn tapped(mut self, tapped: bool) -> Self {
        self.tapped = tapped;
        self
    }

    pub fn is_land(&self) -> bool {
        self.types.contains(CardTypes::LAND)
    }

    pub fn is_creature(&self) -> bool {
        self.types.contains(CardTypes::CREATURE)
    }

    /// Power/toughness rendered as `P/T`, when both are known.
    pub fn pt(&self) -> Option<String> {
        match (&self.power, &self.toughness) {
            (Some(p), Some(t)) => Some(format!("{p}/{t}")),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub life: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub library_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hand_count: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_active: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_left: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub battlefield: Vec<CardView>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub graveyard: Vec<CardView>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub exile: Vec<CardView>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counters: BTreeMap<String, u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_pool: ManaPool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub commanders: Vec<String>,
}

impl PlayerView {
    pub fn new(id: PlayerId, name: impl Into<String>, life: i32) -> Self {
        Self {
            id,
            name: name.into(),
            life,
            library_count: 0,
            hand_count: 0,
            is_active: false,
            has_left: false,
            battlefield: Vec::new(),
            graveyard: Vec::new(),
            exile: Vec::new(),
            counters: BTreeMap::new(),
            mana_pool: ManaPool::default(),
            commanders: Vec::new(),
        }
    }
}

/// An object the bridge player may currently play, with the ability texts
/// the engine reports as playable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayableObject {
    pub id: ObjectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<String>,
}

impl PlayableObject {
    pub fn new<I, S>(id: ObjectId, abilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            abilities: abilities.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameSnapshot {
    pub turn: u32,
    pub phase: String,
    pub step: String,
    pub active_player: String,
    pub priority_player: String,
    /// Seat the bridge plays, when known.
    pub my_player_id: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    /// The bridge player's own hand.
    pub hand: Vec<CardView>,
    pub stack: Vec<CardView>,
    pub playable: Vec<PlayableObject>,
}

impl GameSnapshot {
    pub fn me(&self) -> Option<&PlayerView> {
        let id = self.my_player_id?;
        self.player(id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_by_object(&self, id: ObjectId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id.0 == id.0)
    }

    pub fn is_me(&self, player: &PlayerView) -> bool {
        self.my_player_id == Some(player.id)
    }

    /// True during the bridge player's own precombat or postcombat main step.
    pub fn is_my_main_phase(&self) -> bool {
        let Some(me) = self.me() else {
            return false;
        };
        me.name == self.active_player && self.step.to_ascii_lowercase().contains("main")
    }

    /// Searches hand, stack, then every player's battlefield, graveyard, and
    /// exile for an object.
    pub fn find_card(&self, id: ObjectId) -> Option<(&CardView, Zone)> {
        if let Some(card) = self.hand.iter().find(|c| c.id == id) {
            return Some((card, Zone::Hand));
        }
        if let Some(card) = self.stack.iter().find(|c| c.id == id) {
            return Some((card, Zone::Stack));
        }
        for player in &self.players {
            let zones = [
                (&player.battlefield, Zone::Battlefield),
                (&player.graveyard, Zone::Graveyard),
                (&player.exile, Zone::Exile),
            ];
            for (cards, zone) in zones {
                if let Some(card) = cards.iter().find(|c| c.id == id) {
                    return Some((card, zone));
                }
            }
        }
        None
    }

    /// Finds a visible card by name, ignoring case.
    pub fn find_card_by_name(&self, name: &str) -> Option<&CardView> {
        let matches = |c: &&CardView| c.name.eq_ignore_ascii_case(name);
        self.hand
            .iter()
            .find(matches)
            .or_else(|| self.stack.iter().find(matches))
            .or_else(|| {
                self.players.iter().find_map(|p| {
                    p.battlefield
                        .iter()
                        .chain(&p.graveyard)
                        .chain(&p.exile)
                        .find(matches)
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (GameSnapshot, ObjectId, ObjectId) {
        let me = PlayerId::random();
        let bear = ObjectId::random();
        let bolt = ObjectId::random();
        let mut alice = PlayerView::new(me, "Alice", 20);
        alice.battlefield.push(
            CardView::new(bear, "Grizzly Bears")
                .with_types(CardTypes::CREATURE)
                .with_pt("2", "2"),
        );
        let snapshot = GameSnapshot {
            turn: 3,
            phase: "PRECOMBAT_MAIN".into(),
            step: "PRECOMBAT_MAIN".into(),
            active_player: "Alice".into(),
            my_player_id: Some(me),
            players: vec![alice],
            hand: vec![CardView::new(bolt, "Lightning Bolt").with_types(CardTypes::INSTANT)],
            ..GameSnapshot::default()
        };
        (snapshot, bear, bolt)
    }

    #[test]
    fn test_find_card_reports_zone() {
        let (snapshot, bear, bolt) = sample();
        assert_eq!(snapshot.find_card(bear).map(|(_, z)| z), Some(Zone::Battlefield));
        assert_eq!(snapshot.find_card(bolt).map(|(_, z)| z), Some(Zone::Hand));
        assert!(snapshot.find_card(ObjectId::random()).is_none());
    }

    #[test]
    fn test_find_card_by_name_ignores_case() {
        let (snapshot, bear, _) = sample();
        assert_eq!(snapshot.find_card_by_name("grizzly bears").map(|c| c.id), Some(bear));
    }

    #[test]
    fn test_main_phase_requires_own_turn() {
        let (mut snapshot, _, _) = sample();
        assert!(snapshot.is_my_main_phase());
        snapshot.active_player = "Bob".into();
        assert!(!snapshot.is_my_main_phase());
    }

    #[test]
    fn test_pt_needs_both_values() {
        let card = CardView::new(ObjectId::random(), "Token");
        assert_eq!(card.pt(), None);
        assert_eq!(card.with_pt("1", "1").pt().as_deref(), Some("1/1"));
    }
}
