//! Integration tests for MCP protocol handling.
//!
//! These tests verify the MCP server's JSON-RPC 2.0 protocol implementation,
//! including request/response handling, error responses, and lifecycle
//! management. The server runs over in-memory pipes instead of stdio.

use std::sync::Arc;

use figma_bridge_mcp::catalog::Catalog;
use figma_bridge_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use figma_bridge_mcp::mcp::{McpServer, MessageReader, MessageWriter, ServerState};
use figma_bridge_mcp::relay::{OutboundFrame, RelaySession};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {"name": "figma_get_node", "arguments": {"id": "1:2"}}
    }"#;

    let IncomingMessage::Request(req) = parse_message(json).unwrap() else {
        panic!("Expected Request");
    };
    assert_eq!(req.method, "tools/call");
    assert_eq!(req.id, RequestId::String("call-1".to_string()));
    assert_eq!(req.params.unwrap()["arguments"]["id"], "1:2");
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

/// The client side of an in-memory MCP session.
struct Client {
    input: DuplexStream,
    output: Lines<BufReader<DuplexStream>>,
    server: JoinHandle<ServerState>,
}

impl Client {
    fn start(session: Arc<RelaySession>) -> Self {
        let (input, server_input) = tokio::io::duplex(64 * 1024);
        let (server_output, output) = tokio::io::duplex(64 * 1024);

        let mut server = McpServer::with_transport(
            MessageReader::new(BufReader::new(server_input)),
            MessageWriter::new(server_output),
            Catalog::new(session),
        );
        let server = tokio::spawn(async move {
            server.serve().await.unwrap();
            server.state()
        });

        Self {
            input,
            output: BufReader::new(output).lines(),
            server,
        }
    }

    async fn send(&mut self, message: &Value) {
        self.send_raw(&message.to_string()).await;
    }

    async fn send_raw(&mut self, line: &str) {
        self.input.write_all(line.as_bytes()).await.unwrap();
        self.input.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = self.output.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, message: Value) -> Value {
        self.send(&message).await;
        self.recv().await
    }

    async fn initialise(&mut self) {
        let response = self
            .request(json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0.0"}
                }
            }))
            .await;
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "figma-bridge-mcp");

        self.send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
    }

    async fn shutdown(self) -> ServerState {
        drop(self.input);
        self.server.await.unwrap()
    }
}

#[tokio::test]
async fn test_tools_require_initialisation() {
    let mut client = Client::start(Arc::new(RelaySession::default()));

    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["error"]["message"], "Server not initialised");

    // ping is always answered
    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}))
        .await;
    assert_eq!(response["result"], json!({}));

    assert_eq!(client.shutdown().await, ServerState::ShuttingDown);
}

#[tokio::test]
async fn test_initialise_and_list_tools() {
    let mut client = Client::start(Arc::new(RelaySession::default()));
    client.initialise().await;

    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await;
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 48);

    let rectangle = tools
        .iter()
        .find(|tool| tool["name"] == "figma_create_rectangle")
        .unwrap();
    assert_eq!(rectangle["inputSchema"]["type"], "object");
    assert_eq!(
        rectangle["inputSchema"]["properties"]["width"]["type"],
        "number"
    );

    let response = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05"}
        }))
        .await;
    assert_eq!(response["error"]["code"], -32600);

    client.shutdown().await;
}

#[tokio::test]
async fn test_protocol_errors() {
    let mut client = Client::start(Arc::new(RelaySession::default()));
    client.initialise().await;

    client.send_raw("not valid json").await;
    let response = client.recv().await;
    assert_eq!(response["error"]["code"], -32700);
    assert!(response.get("id").is_none());

    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}))
        .await;
    assert_eq!(response["error"]["code"], -32601);

    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call"}))
        .await;
    assert_eq!(response["error"]["code"], -32602);

    // Blank lines are skipped without a response.
    client.send_raw("").await;
    let response = client
        .request(json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}))
        .await;
    assert_eq!(response["id"], 3);

    client.shutdown().await;
}

#[tokio::test]
async fn test_tool_failures_are_results() {
    let mut client = Client::start(Arc::new(RelaySession::default()));
    client.initialise().await;

    let response = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "figma_get_selection"}
        }))
        .await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Error: Not connected to Figma plugin. Please open the plugin in Figma."
    );

    let response = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "figma_teleport", "arguments": {}}
        }))
        .await;
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Error: Unknown tool: figma_teleport"
    );

    client.shutdown().await;
}

#[tokio::test]
async fn test_slow_tool_call_does_not_block_ping() {
    let session = Arc::new(RelaySession::default());
    let (tx, mut plugin) = mpsc::unbounded_channel();
    session.attach(tx);

    let mut client = Client::start(Arc::clone(&session));
    client.initialise().await;

    client
        .send(&json!({
            "jsonrpc": "2.0",
            "id": "slow",
            "method": "tools/call",
            "params": {"name": "figma_get_node", "arguments": {"id": "1:2"}}
        }))
        .await;

    let Some(OutboundFrame::Text(frame)) = plugin.recv().await else {
        panic!("expected a command frame");
    };
    let command: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(command["type"], "get-node");

    // The tool call is still waiting on the plugin; ping answers first.
    let response = client
        .request(json!({"jsonrpc": "2.0", "id": "ping", "method": "ping"}))
        .await;
    assert_eq!(response["id"], "ping");

    session.on_message(
        &json!({"requestId": command["requestId"], "type": "node", "data": {"id": "1:2"}})
            .to_string(),
    );

    let response = client.recv().await;
    assert_eq!(response["id"], "slow");
    assert!(response["result"].get("isError").is_none());
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"id": "1:2"}));

    client.shutdown().await;
}

#[tokio::test]
async fn test_input_eof_waits_for_in_flight_call() {
    let session = Arc::new(RelaySession::default());
    let (tx, mut plugin) = mpsc::unbounded_channel();
    session.attach(tx);

    let mut client = Client::start(Arc::clone(&session));
    client.initialise().await;
    client
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {"name": "figma_get_selection"}
        }))
        .await;

    let Some(OutboundFrame::Text(frame)) = plugin.recv().await else {
        panic!("expected a command frame");
    };
    let command: Value = serde_json::from_str(&frame).unwrap();

    // Close the client's input before the plugin answers.
    let Client {
        input,
        mut output,
        server,
    } = client;
    drop(input);

    session.on_message(
        &json!({"requestId": command["requestId"], "type": "selection", "data": []}).to_string(),
    );

    let line = output.next_line().await.unwrap().unwrap();
    let response: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(response["id"], 9);
    assert_eq!(response["result"]["content"][0]["text"], "[]");

    assert_eq!(server.await.unwrap(), ServerState::ShuttingDown);
}

#[tokio::test(start_paused = true)]
async fn test_input_eof_abandons_stuck_call_after_grace() {
    let session = Arc::new(RelaySession::new(std::time::Duration::from_secs(600)));
    let (tx, mut plugin) = mpsc::unbounded_channel();
    session.attach(tx);

    let mut client = Client::start(Arc::clone(&session));
    client.initialise().await;
    client
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 10,
            "method": "tools/call",
            "params": {"name": "figma_get_selection"}
        }))
        .await;
    assert!(plugin.recv().await.is_some());

    let started = tokio::time::Instant::now();
    assert_eq!(client.shutdown().await, ServerState::ShuttingDown);

    let waited = started.elapsed();
    assert!(waited >= figma_bridge_mcp::mcp::server::SHUTDOWN_GRACE);
    assert!(waited < std::time::Duration::from_secs(600));
}
