//! MCP requests against a live runtime, with the engine on an in-memory link.
use std::time::Duration;

use bridge_runtime::{ChannelSession, Runtime};
use bridge_server::{McpServer, ToolDispatcher, engine_link};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

async fn server() -> (McpServer, Runtime, tokio::sync::mpsc::UnboundedReceiver<bridge_runtime::Outbound>) {
    let (session, outbound) = ChannelSession::new();
    let runtime = Runtime::builder().session(session).build().await.unwrap();
    let server = McpServer::new(ToolDispatcher::new(runtime.handle()));
    (server, runtime, outbound)
}

async fn request(server: &McpServer, id: u64, method: &str, params: Value) -> Value {
    let line = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
    let response = server.handle_line(&line.to_string()).await.unwrap();
    serde_json::from_str(&response).unwrap()
}

/// Calls a tool and decodes the JSON record inside the text content.
async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> (Value, bool) {
    let response = request(
        server,
        7,
        "tools/call",
        json!({ "name": name, "arguments": arguments }),
    )
    .await;
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap();
    (
        serde_json::from_str(text).unwrap(),
        result["isError"].as_bool().unwrap(),
    )
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let (server, _runtime, _outbound) = server().await;

    let init = request(&server, 1, "initialize", json!({})).await;
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(init["id"], 1);

    let list = request(&server, 2, "tools/list", Value::Null).await;
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"choose_by_index"));
    assert!(names.contains(&"drain_until_event"));
    assert_eq!(names.len(), 11);

    let ping = request(&server, 3, "ping", Value::Null).await;
    assert_eq!(ping["result"], json!({}));
}

#[tokio::test]
async fn test_protocol_errors() {
    let (server, _runtime, _outbound) = server().await;

    let notification = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    assert!(server.handle_line(&notification.to_string()).await.is_none());

    let unknown = request(&server, 4, "resources/list", Value::Null).await;
    assert_eq!(unknown["error"]["code"], -32601);

    let garbage: Value =
        serde_json::from_str(&server.handle_line("{not json").await.unwrap()).unwrap();
    assert_eq!(garbage["error"]["code"], -32700);
}

#[tokio::test]
async fn test_tool_errors_are_structured() {
    let (server, _runtime, _outbound) = server().await;

    let (reply, is_error) = call_tool(&server, "is_pending", json!({})).await;
    assert!(is_error);
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error_kind"], "no_active_context");

    let (reply, is_error) = call_tool(&server, "shuffle_library", json!({})).await;
    assert!(is_error);
    assert_eq!(reply["error_kind"], "unknown_tool");

    let (reply, _) = call_tool(&server, "lookup_card", json!({ "card_name": "Black Lotus" })).await;
    assert_eq!(reply["success"], false);
    assert_eq!(reply["error_kind"], "card_not_found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_engine_decision_answered_through_tools() {
    let (server, runtime, outbound) = server().await;

    let (engine_side, bridge_side) = tokio::io::duplex(16 * 1024);
    let (bridge_read, bridge_write) = tokio::io::split(bridge_side);
    let link = tokio::spawn(engine_link::pump(
        BufReader::new(bridge_read),
        bridge_write,
        runtime.events(),
        outbound,
    ));

    let (engine_read, mut engine_write) = tokio::io::split(engine_side);
    let mut engine_lines = BufReader::new(engine_read).lines();

    let context = "6f1c1c3e-3a47-4b5b-9a7e-1f2d3c4b5a69";
    let alice = "0b5f3c7e-8d2a-4e41-9c3b-2a6d5e4f7a18";
    let bear = "9a7e1f2d-3c4b-4b5b-8a47-6f1c1c3e5a69";
    let events = [
        json!({ "event": "game_started", "context": context, "player": alice }),
        json!({
            "event": "decision",
            "context": context,
            "prompt": "Choose target creature",
            "decision": { "kind": "target", "required": true, "targets": [bear] },
            "snapshot": {
                "turn": 3,
                "players": [{
                    "id": alice,
                    "name": "Alice",
                    "life": 20,
                    "battlefield": [{ "id": bear, "name": "Grizzly Bears", "power": "2", "toughness": "2" }]
                }]
            }
        }),
        json!({ "event": "chat", "context": context, "text": "Alice casts Shock" }),
    ];
    for event in events {
        engine_write
            .write_all(format!("{event}\n").as_bytes())
            .await
            .unwrap();
    }

    let (waited, _) = call_tool(&server, "wait_for_next", json!({ "timeout_ms": 5000 })).await;
    assert_eq!(waited["action_pending"], true);
    assert_eq!(waited["action_type"], "TARGET");
    let decision_id = waited["decision_id"].clone();

    let (choices, is_error) = call_tool(&server, "get_choices", json!({})).await;
    assert!(!is_error);
    assert_eq!(choices["response_type"], "index");
    let first = choices["choices"][0]["description"].as_str().unwrap();
    assert!(first.starts_with("Grizzly Bears"));
    assert!(!choices.to_string().contains(bear));

    let (state, is_error) = call_tool(&server, "get_snapshot", json!({})).await;
    assert!(!is_error);
    assert_eq!(state["snapshot"]["players"][0]["is_you"], true);
    assert_eq!(
        state["snapshot"]["players"][0]["battlefield"][0]["name"],
        "Grizzly Bears"
    );
    let rendered = state.to_string();
    assert!(!rendered.contains(bear));
    assert!(!rendered.contains(alice));

    let (chosen, is_error) = call_tool(
        &server,
        "choose_by_index",
        json!({ "index": 0, "decision_id": decision_id }),
    )
    .await;
    assert!(!is_error);
    assert_eq!(chosen["answer"], "Grizzly Bears");

    let sent = tokio::time::timeout(Duration::from_secs(5), engine_lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let sent: Value = serde_json::from_str(&sent).unwrap();
    assert_eq!(sent["type"], "answer");
    assert_eq!(sent["answer"], json!({ "type": "object", "value": bear }));

    let mut tail = Value::Null;
    for _ in 0..100 {
        tail = call_tool(&server, "get_log_tail", json!({ "max_chars": 0 })).await.0;
        if tail["log"] == "Alice casts Shock" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(tail["log"], "Alice casts Shock");

    engine_write.shutdown().await.unwrap();
    link.await.unwrap().unwrap();
}
