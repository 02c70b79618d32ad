//! Card rules lookup.
//!
//! The snapshot only describes cards that are visible in the current game.
//! A [`CardOracle`] answers for everything else; [`StaticCardOracle`] serves
//! rules from an in-memory table, optionally loaded from a JSON card file.
mod cards;

use async_trait::async_trait;
use decision_core::{CardView, GameSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cards::StaticCardOracle;

/// Rules text and printed characteristics of one card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRules {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mana_cost: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_line: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toughness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
}

impl From<&CardView> for CardRules {
    fn from(card: &CardView) -> Self {
        Self {
            name: card.name.clone(),
            mana_cost: card.mana_cost.clone(),
            type_line: card.type_line.clone(),
            rules: card.rules.clone(),
            power: card.power.clone(),
            toughness: card.toughness.clone(),
            set_code: None,
            card_number: None,
        }
    }
}

/// Where a lookup was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Game,
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLookup {
    pub source: LookupSource,
    #[serde(flatten)]
    pub card: CardRules,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to read card file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse card file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of card rules for cards outside the current snapshot.
#[async_trait]
pub trait CardOracle: Send + Sync {
    /// Case-insensitive lookup by card name.
    async fn card_by_name(&self, name: &str) -> Option<CardRules>;
}

/// Resolves a card by name: the live snapshot first, then the oracle.
pub async fn lookup(
    snapshot: Option<&GameSnapshot>,
    oracle: &dyn CardOracle,
    name: &str,
) -> Option<CardLookup> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if let Some(card) = snapshot.and_then(|s| s.find_card_by_name(name)) {
        return Some(CardLookup {
            source: LookupSource::Game,
            card: CardRules::from(card),
        });
    }
    oracle.card_by_name(name).await.map(|card| CardLookup {
        source: LookupSource::Database,
        card,
    })
}
