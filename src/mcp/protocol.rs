//! JSON-RPC 2.0 messages exchanged with an MCP client.
//!
//! Only the subset the conversion server needs is modelled: incoming
//! requests and notifications, outgoing results and errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this server speaks.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialisation.
pub const SERVER_NAME: &str = "mson-runtime-mcp";

const JSONRPC_VERSION: &str = "2.0";

/// A request id. MCP forbids `null` ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id.
    Number(i64),
    /// String id.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// An incoming request.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// Request id, echoed in the reply.
    pub id: RequestId,
    /// Method name, e.g. `tools/call`.
    pub method: String,
    /// Method parameters.
    pub params: Option<Value>,
}

/// An incoming notification; never answered.
#[derive(Debug, Clone)]
pub struct JsonRpcNotification {
    /// Notification name, e.g. `notifications/initialized`.
    pub method: String,
}

/// A decoded incoming message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Expects a response.
    Request(JsonRpcRequest),
    /// Fire and forget.
    Notification(JsonRpcNotification),
}

/// Wire shape shared by requests and notifications.
#[derive(Deserialize)]
struct Envelope {
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<RequestId>,
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// Decodes one line of input.
///
/// # Errors
///
/// Returns a parse error for malformed JSON and an invalid-request error
/// for JSON that is not a JSON-RPC 2.0 request or notification.
pub fn parse_message(line: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(line).map_err(|_| JsonRpcError::parse_error())?;
    if !value.is_object() {
        return Err(JsonRpcError::parse_error());
    }

    let envelope =
        Envelope::deserialize(value).map_err(|_| JsonRpcError::invalid_request(None))?;
    if envelope.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
        return Err(JsonRpcError::invalid_request(envelope.id));
    }
    let method = match envelope.method {
        Some(method) if !method.is_empty() => method,
        _ => return Err(JsonRpcError::invalid_request(envelope.id)),
    };

    Ok(match envelope.id {
        Some(id) => IncomingMessage::Request(JsonRpcRequest {
            id,
            method,
            params: envelope.params,
        }),
        None => IncomingMessage::Notification(JsonRpcNotification { method }),
    })
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    /// Id of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps a method result.
    #[must_use]
    pub const fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// Standard JSON-RPC error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed JSON.
    ParseError = -32700,
    /// Not a valid request object, or not allowed in the current state.
    InvalidRequest = -32600,
    /// Unknown method.
    MethodNotFound = -32601,
    /// Parameters do not fit the method.
    InvalidParams = -32602,
    /// Failure inside the server.
    InternalError = -32603,
}

impl ErrorCode {
    /// Numeric wire code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    /// Numeric code.
    pub code: i32,
    /// Short description.
    pub message: String,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    jsonrpc: &'static str,
    /// Id of the failed request; absent when it could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Error details.
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Builds an error reply.
    #[must_use]
    pub fn new(id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code: code.code(),
                message: message.into(),
            },
        }
    }

    /// Input was not JSON.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, ErrorCode::ParseError, "Parse error")
    }

    /// Input was JSON but not a JSON-RPC 2.0 message.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::InvalidRequest, "Invalid Request")
    }

    /// Request arrived in a lifecycle state that does not allow it.
    #[must_use]
    pub fn wrong_state(id: RequestId, message: &str) -> Self {
        Self::new(Some(id), ErrorCode::InvalidRequest, message)
    }

    /// Unknown method.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            ErrorCode::MethodNotFound,
            format!("Method not found: {method}"),
        )
    }

    /// Parameters could not be decoded.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InvalidParams, message)
    }

    /// The server failed to build a reply.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), ErrorCode::InternalError, message)
    }
}
