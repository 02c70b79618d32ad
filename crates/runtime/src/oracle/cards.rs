//! [`CardOracle`] backed by an in-memory name table.
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use super::{CardOracle, CardRules, OracleError};

/// Card table keyed by lowercased name.
#[derive(Debug, Clone, Default)]
pub struct StaticCardOracle {
    cards: HashMap<String, CardRules>,
}

impl StaticCardOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = CardRules>) -> Self {
        let mut oracle = Self::new();
        for card in cards {
            oracle.add_card(card);
        }
        oracle
    }

    /// Loads a JSON array of card records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| OracleError::Io {
            path: display.clone(),
            source,
        })?;
        let cards: Vec<CardRules> =
            serde_json::from_str(&raw).map_err(|source| OracleError::Parse {
                path: display,
                source,
            })?;
        Ok(Self::from_cards(cards))
    }

    /// Adds or replaces a card definition.
    pub fn add_card(&mut self, card: CardRules) {
        self.cards.insert(card.name.to_lowercase(), card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[async_trait]
impl CardOracle for StaticCardOracle {
    async fn card_by_name(&self, name: &str) -> Option<CardRules> {
        self.cards.get(&name.trim().to_lowercase()).cloned()
    }
}
