//! Named tools exposed to the agent.
//!
//! Each tool maps onto one [`BridgeHandle`] operation and replies with a JSON
//! object carrying `success`. Failures are structured
//! (`success: false`, `error`, `error_kind`) rather than transport errors.
use std::time::Duration;

use bridge_runtime::{BridgeError, BridgeHandle};
use decision_core::ChoiceInput;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use crate::mcp::McpTool;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("failed to encode reply: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::Bridge(err) => err.kind(),
            ToolError::CardNotFound(_) => "card_not_found",
            ToolError::Join(_) => "internal",
            ToolError::Encode(_) => "internal",
        }
    }

    /// Structured reply for the agent.
    pub fn to_reply(&self) -> Value {
        json!({
            "success": false,
            "error": self.to_string(),
            "error_kind": self.kind(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TimeoutArgs {
    timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DrainArgs {
    min_new_chars: Option<usize>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogTailArgs {
    max_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ChatArgs {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LookupArgs {
    card_name: String,
}

/// Routes tool calls to the bridge.
#[derive(Clone)]
pub struct ToolDispatcher {
    handle: BridgeHandle,
}

impl ToolDispatcher {
    pub fn new(handle: BridgeHandle) -> Self {
        Self { handle }
    }

    /// Runs a tool. Errors are folded into the structured reply; the flag
    /// reports whether the call failed.
    pub async fn call(&self, name: &str, arguments: Value) -> (Value, bool) {
        debug!(tool = name, "tool call");
        match self.dispatch(name, arguments).await {
            Ok(reply) => (reply, false),
            Err(err) => {
                debug!(tool = name, error = %err, "tool failed");
                (err.to_reply(), true)
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        match name {
            "is_pending" => {
                let pending = self.handle.is_pending()?;
                let mut reply = success(&pending)?;
                reply.insert("action_pending".into(), Value::Bool(pending.is_some()));
                Ok(Value::Object(reply))
            }
            "get_choices" => reply(&self.handle.get_choices()?),
            "choose_by_index" => {
                let input: ChoiceInput = parse("choose_by_index", arguments)?;
                reply(&self.handle.choose(&input)?)
            }
            "take_default" => reply(&self.handle.take_default()?),
            "wait_for_next" => {
                let args: TimeoutArgs = parse("wait_for_next", arguments)?;
                let handle = self.handle.clone();
                let report = tokio::task::spawn_blocking(move || {
                    handle.wait_for_next(args.timeout_ms.map(Duration::from_millis))
                })
                .await??;
                reply(&report)
            }
            "pass_priority" => {
                let args: TimeoutArgs = parse("pass_priority", arguments)?;
                let handle = self.handle.clone();
                let report = tokio::task::spawn_blocking(move || {
                    handle.pass_priority(args.timeout_ms.map(Duration::from_millis))
                })
                .await??;
                reply(&report)
            }
            "drain_until_event" => {
                let args: DrainArgs = parse("drain_until_event", arguments)?;
                let handle = self.handle.clone();
                let report = tokio::task::spawn_blocking(move || {
                    handle.drain_until_event(
                        args.min_new_chars,
                        args.timeout_ms.map(Duration::from_millis),
                    )
                })
                .await??;
                reply(&report)
            }
            "get_snapshot" => {
                let state = self.handle.game_state()?;
                Ok(json!({ "success": true, "snapshot": state }))
            }
            "get_log_tail" => {
                let args: LogTailArgs = parse("get_log_tail", arguments)?;
                reply(&self.handle.log_tail(args.max_chars.unwrap_or(0))?)
            }
            "send_chat" => {
                let args: ChatArgs = parse("send_chat", arguments)?;
                self.handle.send_chat(&args.message)?;
                Ok(json!({ "success": true }))
            }
            "lookup_card" => {
                let args: LookupArgs = parse("lookup_card", arguments)?;
                match self.handle.lookup_card(&args.card_name).await? {
                    Some(found) => reply(&found),
                    None => Err(ToolError::CardNotFound(args.card_name)),
                }
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn parse<T: DeserializeOwned>(tool: &'static str, arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments { tool, source })
}

/// Serializes a record and marks it successful.
fn success<T: serde::Serialize>(record: &T) -> Result<Map<String, Value>, ToolError> {
    let mut map = match serde_json::to_value(record).map_err(ToolError::Encode)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("result".into(), other);
            map
        }
    };
    map.insert("success".into(), Value::Bool(true));
    Ok(map)
}

fn reply<T: serde::Serialize>(record: &T) -> Result<Value, ToolError> {
    success(record).map(Value::Object)
}

/// Tool catalogue advertised through `tools/list`.
pub fn definitions() -> Vec<McpTool> {
    let no_args = json!({ "type": "object", "properties": {} });
    let timeout = |default: u64| {
        json!({
            "type": "object",
            "properties": {
                "timeout_ms": {
                    "type": "integer",
                    "description": format!("Maximum wait in milliseconds (default: {default})"),
                }
            }
        })
    };

    vec![
        McpTool::new(
            "is_pending",
            "Check whether a decision is waiting for an answer. Returns action_pending, and \
             decision_id, action_type and message when one is.",
            no_args.clone(),
        ),
        McpTool::new(
            "get_choices",
            "List the choices for the pending decision. Returns response_type ('boolean', \
             'select', 'index', 'pile', 'amount', 'multi_amount'), indexed choices, and game \
             context. Call this before choose_by_index.",
            no_args.clone(),
        ),
        McpTool::new(
            "choose_by_index",
            "Answer the pending decision. Use 'index' for an indexed choice, 'answer' for \
             yes/no or to pass/cancel, 'amount' or 'amounts' for numbers, 'pile' (1 or 2) for \
             piles. Pass decision_id to guard against answering a newer decision.",
            json!({
                "type": "object",
                "properties": {
                    "index": { "type": "integer", "description": "Choice index from get_choices" },
                    "answer": { "type": "boolean", "description": "Yes/no, or false to pass or cancel" },
                    "amount": { "type": "integer", "description": "Number for amount decisions" },
                    "amounts": {
                        "type": "array",
                        "items": { "type": "integer" },
                        "description": "One number per item for multi-amount decisions",
                    },
                    "pile": { "type": "integer", "description": "1 or 2" },
                    "decision_id": { "type": "integer", "description": "Decision this answer is for" },
                }
            }),
        ),
        McpTool::new(
            "take_default",
            "Answer the pending decision with a safe default: pass priority, decline optional \
             effects, pick the first required target, pay mana when unambiguous. Reports \
             needs_manual_choice instead of guessing.",
            no_args.clone(),
        ),
        McpTool::new(
            "wait_for_next",
            "Block until a decision is pending, the game ends, or the timeout elapses.",
            timeout(15_000),
        ),
        McpTool::new(
            "pass_priority",
            "Pass priority until you have something playable or a different kind of decision \
             arrives. Returns actions_passed and has_playable_cards.",
            timeout(30_000),
        ),
        McpTool::new(
            "drain_until_event",
            "Auto-answer decisions with defaults until the game state changes (turn, life, \
             permanents, graveyards), the log grows, or a decision needs a manual choice.",
            json!({
                "type": "object",
                "properties": {
                    "min_new_chars": {
                        "type": "integer",
                        "description": "Log growth that counts as an event (default: 50)",
                    },
                    "timeout_ms": {
                        "type": "integer",
                        "description": "Maximum wait in milliseconds (default: 10000)",
                    },
                }
            }),
        ),
        McpTool::new(
            "get_snapshot",
            "Current game state: turn, phase, players with life, battlefield, graveyard and \
             mana pool, your hand, the stack, and playable objects.",
            no_args.clone(),
        ),
        McpTool::new(
            "get_log_tail",
            "The end of the game log.",
            json!({
                "type": "object",
                "properties": {
                    "max_chars": {
                        "type": "integer",
                        "description": "Characters to return from the end (0 = all)",
                    }
                }
            }),
        ),
        McpTool::new(
            "send_chat",
            "Send a chat message to the game.",
            json!({
                "type": "object",
                "properties": { "message": { "type": "string" } },
                "required": ["message"],
            }),
        ),
        McpTool::new(
            "lookup_card",
            "Rules text for a card by name, from the current game or the card database.",
            json!({
                "type": "object",
                "properties": { "card_name": { "type": "string" } },
                "required": ["card_name"],
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_names_are_unique() {
        let tools = definitions();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), 11);
    }

    #[test]
    fn test_parse_accepts_missing_arguments() {
        let args: DrainArgs = parse("drain_until_event", Value::Null).unwrap();
        assert!(args.min_new_chars.is_none());
        assert!(matches!(
            parse::<ChatArgs>("send_chat", json!({})),
            Err(ToolError::InvalidArguments { tool: "send_chat", .. })
        ));
    }

    #[test]
    fn test_success_marks_reply() {
        let reply = reply(&json!({ "answer": "Forest" })).unwrap();
        assert_eq!(reply["success"], Value::Bool(true));
        assert_eq!(reply["answer"], "Forest");
    }
}
