//! Integration tests for MCP protocol handling.
//!
//! These tests exercise JSON-RPC 2.0 message parsing for the requests an
//! assistant sends while converting a model: handshake, tool discovery and
//! tool calls carrying MSON payloads.

use mson_runtime_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use mson_runtime_mcp::mcp::server::ToolCallParams;
use mson_runtime_mcp::mson::Model;

fn request(json: &str) -> mson_runtime_mcp::mcp::JsonRpcRequest {
    match parse_message(json) {
        Ok(IncomingMessage::Request(req)) => req,
        other => panic!("Expected Request, got {other:?}"),
    }
}

#[test]
fn parse_initialize_request() {
    let req = request(
        r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0.0" }
        }
    }"#,
    );

    assert_eq!(req.method, "initialize");
    assert_eq!(req.id, RequestId::Number(1));
}

#[test]
fn parse_string_request_id() {
    let req = request(r#"{"jsonrpc": "2.0", "id": "convert-7", "method": "tools/list"}"#);
    assert_eq!(req.id, RequestId::String("convert-7".to_string()));
    assert!(req.params.is_none());
}

#[test]
fn parse_initialized_notification() {
    let msg = parse_message(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#);

    match msg {
        Ok(IncomingMessage::Notification(notif)) => {
            assert_eq!(notif.method, "notifications/initialized");
        }
        other => panic!("Expected Notification, got {other:?}"),
    }
}

#[test]
fn tool_call_carries_mson_model() {
    let req = request(
        r#"{
        "jsonrpc": "2.0",
        "id": 3,
        "method": "tools/call",
        "params": {
            "name": "convert_to_system_runtime",
            "arguments": {
                "version": "1.2.0",
                "model": {
                    "id": "shop",
                    "name": "Shop",
                    "type": "class",
                    "entities": [
                        { "id": "customer", "name": "Customer", "type": "class",
                          "attributes": [{ "name": "email", "type": "string" }] },
                        { "id": "account", "name": "Account", "type": "class" }
                    ],
                    "relationships": [
                        { "id": "owns", "from": "customer", "to": "account",
                          "type": "association",
                          "multiplicity": { "from": "1", "to": "0..*" } }
                    ]
                }
            }
        }
    }"#,
    );

    let params: ToolCallParams = serde_json::from_value(req.params.unwrap()).unwrap();
    assert_eq!(params.name, "convert_to_system_runtime");
    assert_eq!(params.arguments["version"], "1.2.0");

    let model: Model = serde_json::from_value(params.arguments["model"].clone()).unwrap();
    assert_eq!(model.entities.len(), 2);
    assert_eq!(model.relationships.len(), 1);
    assert!(model.entities[1].attributes.is_empty());
}

#[test]
fn tool_call_without_arguments() {
    let req = request(
        r#"{"jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "validate_system_runtime_bundle"}}"#,
    );

    let params: ToolCallParams = serde_json::from_value(req.params.unwrap()).unwrap();
    assert!(params.arguments.is_null());
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = parse_message("not valid json").unwrap_err();
    assert_eq!(err.error.code, -32700);
    assert!(err.id.is_none());
}

#[test]
fn missing_jsonrpc_version_is_rejected() {
    let result = parse_message(r#"{"id": 1, "method": "tools/list"}"#);
    assert!(result.is_err());
}
