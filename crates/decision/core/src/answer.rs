//! Typed answers delivered back to the engine.
use core::fmt;

use crate::ids::{ObjectId, PlayerId};
use crate::mana::ManaColor;

/// Exactly one of these is sent per decision.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", content = "value", rename_all = "snake_case")
)]
pub enum EngineAnswer {
    Boolean(bool),
    Integer(i32),
    /// Selected object; `None` declines.
    Object(Option<ObjectId>),
    /// Selected string; `None` declines.
    Text(Option<String>),
    /// Per-item amounts, comma-delimited on the wire.
    #[cfg_attr(feature = "serde", serde(with = "delimited"))]
    Amounts(Vec<i32>),
    /// Spend one colour from a player's pool.
    PoolMana { player: PlayerId, mana: ManaColor },
}

impl EngineAnswer {
    /// Comma-delimited wire form of an amount list.
    pub fn delimited(amounts: &[i32]) -> String {
        amounts
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for EngineAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineAnswer::Boolean(b) => write!(f, "{b}"),
            EngineAnswer::Integer(n) => write!(f, "{n}"),
            EngineAnswer::Object(Some(id)) => write!(f, "object {id}"),
            EngineAnswer::Object(None) => write!(f, "no object"),
            EngineAnswer::Text(Some(text)) => write!(f, "text {text:?}"),
            EngineAnswer::Text(None) => write!(f, "no text"),
            EngineAnswer::Amounts(amounts) => write!(f, "amounts {}", Self::delimited(amounts)),
            EngineAnswer::PoolMana { mana, .. } => write!(f, "pool {mana}"),
        }
    }
}

#[cfg(feature = "serde")]
mod delimited {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::EngineAnswer;

    pub fn serialize<S: Serializer>(amounts: &[i32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&EngineAnswer::delimited(amounts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i32>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        text.split(',')
            .map(|part| part.trim().parse::<i32>().map_err(D::Error::custom))
            .collect()
    }
}
