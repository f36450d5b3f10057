//! MCP server implementation for MSON -> System Runtime conversion.
//!
//! Lifecycle: `initialize` moves the server to initialising, the client's
//! `notifications/initialized` makes it running, and only then are
//! `tools/list` and `tools/call` served. EOF or SIGINT/SIGTERM end the loop.
//!
//! # Tools
//!
//! - `validate_mson_model`: soft consistency checks over a model
//! - `convert_to_system_runtime`: model -> bundle, optionally validated
//! - `validate_system_runtime_bundle`: validates any bundle
//! - `preview_entity`: schema and type model of a single entity

use std::borrow::Cow;
use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::BundleConfig;
use crate::diagnostics::has_errors;
use crate::error::ToolError;
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::StdioTransport;
use crate::mson::{check_model, Model};
use crate::runtime::validate::check_semantics;
use crate::runtime::{
    assemble, is_semantic_version, to_model, to_schema, validate_bundle, AssembleOptions,
};

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for `initialize`.
    AwaitingInit,
    /// Waiting for `notifications/initialized`.
    Initialising,
    /// Serving tools.
    Running,
    /// The loop is about to exit.
    ShuttingDown,
}

/// The parts of `initialize` params the server looks at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
    protocol_version: String,
    #[serde(default)]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientInfo {
    name: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // skip_serializing_if passes &T
const fn is_false(b: &bool) -> bool {
    !*b
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Creates a result holding pretty-printed JSON.
    fn json(value: &Value, is_error: bool) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) if is_error => Self::error(text),
            Ok(text) => Self::text(text),
            Err(source) => {
                let e = ToolError::Serialisation { source };
                tracing::error!(error = %e, "Failed to serialise tool output");
                Self::error(e.to_string())
            }
        }
    }
}

impl From<ToolError> for ToolCallResult {
    fn from(e: ToolError) -> Self {
        Self::error(e.to_string())
    }
}

/// The MCP server for MSON -> System Runtime conversion.
pub struct McpServer {
    state: ServerState,
    transport: StdioTransport,
    /// Set once `initialize` succeeds.
    protocol_version: Option<String>,
    /// Defaults applied to conversions.
    settings: BundleConfig,
}

impl McpServer {
    /// Creates a server on stdio with the given bundle defaults.
    #[must_use]
    pub fn new(settings: BundleConfig) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::stdio(),
            protocol_version: None,
            settings,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Serves requests until stdin closes or a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O or signal registration fails.
    pub async fn run(&mut self) -> io::Result<()> {
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        while self.state != ServerState::ShuttingDown {
            tokio::select! {
                received = &mut shutdown => {
                    info!(signal = received?, "Shutdown signal received");
                    self.state = ServerState::ShuttingDown;
                }
                line = self.transport.read_line() => {
                    self.handle_transport_result(line).await?;
                }
            }
        }

        Ok(())
    }

    async fn handle_transport_result(
        &mut self,
        line: io::Result<Option<String>>,
    ) -> io::Result<()> {
        match line? {
            None => {
                info!("stdin closed, shutting down");
                self.state = ServerState::ShuttingDown;
                Ok(())
            }
            Some(line) if line.trim().is_empty() => Ok(()),
            Some(line) => self.handle_line(&line).await,
        }
    }

    async fn handle_line(&mut self, line: &str) -> io::Result<()> {
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => {
                debug!(id = %req.id, method = %req.method, "Request");
                match self.dispatch(&req) {
                    Ok(response) => self.transport.send(&response).await,
                    Err(error) => self.transport.send(&error).await,
                }
            }
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                Ok(())
            }
            Err(error) => {
                debug!(code = error.error.code, "Rejected malformed message");
                self.transport.send(&error).await
            }
        }
    }

    /// Routes a request to its handler.
    fn dispatch(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let result = match req.method.as_str() {
            "initialize" => self.handle_initialize(req)?,
            "tools/list" => {
                self.require_running(&req.id)?;
                json!({ "tools": Self::get_tool_definitions() })
            }
            "tools/call" => self.handle_tools_call(req)?,
            "ping" => json!({}),
            _ => return Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            info!("Client initialised, server running");
            self.state = ServerState::Running;
        } else {
            debug!(method = %notif.method, "Ignored notification");
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::wrong_state(
                req.id.clone(),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = decode_params(req, "initialize")?;
        info!(
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested_version = %params.protocol_version,
            "Initialize request received"
        );

        self.protocol_version = Some(MCP_PROTOCOL_VERSION.to_string());
        self.state = ServerState::Initialising;

        Ok(json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        }))
    }

    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = decode_params(req, "tool call")?;
        info!(tool = %params.name, "Tool call");

        let result = self.call_tool(&params.name, &params.arguments);

        serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(req.id.clone(), "Failed to serialise result")
        })
    }

    /// Runs a tool by name.
    fn call_tool(&self, name: &str, arguments: &Value) -> ToolCallResult {
        match name {
            "validate_mson_model" => Self::call_validate_mson_model(arguments),
            "convert_to_system_runtime" => self.call_convert_to_system_runtime(arguments),
            "validate_system_runtime_bundle" => Self::call_validate_bundle(arguments),
            "preview_entity" => Self::call_preview_entity(arguments),
            _ => ToolCallResult::error(format!("Unknown tool: {name}")),
        }
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state == ServerState::Running {
            Ok(())
        } else {
            Err(JsonRpcError::wrong_state(id.clone(), "Server not initialised"))
        }
    }

    /// Returns the list of available tools.
    #[allow(clippy::too_many_lines)]
    fn get_tool_definitions() -> Vec<ToolDefinition> {
        let model_schema = json!({
            "type": "object",
            "description": "MSON model: {id, name, type, description?, entities, relationships}",
            "properties": {
                "id": { "type": "string" },
                "name": { "type": "string" },
                "type": {
                    "type": "string",
                    "enum": ["class", "component", "deployment", "usecase"]
                },
                "description": { "type": "string" },
                "entities": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "type": {
                                "type": "string",
                                "enum": ["class", "interface", "enum", "component", "actor"]
                            },
                            "attributes": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "name": { "type": "string" },
                                        "type": { "type": "string" },
                                        "visibility": {
                                            "type": "string",
                                            "enum": ["public", "private", "protected", "package"]
                                        },
                                        "isStatic": { "type": "boolean" },
                                        "isReadonly": { "type": "boolean" }
                                    },
                                    "required": ["name", "type"]
                                }
                            },
                            "methods": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "name": { "type": "string" },
                                        "parameters": {
                                            "type": "array",
                                            "items": {
                                                "type": "object",
                                                "properties": {
                                                    "name": { "type": "string" },
                                                    "type": { "type": "string" }
                                                },
                                                "required": ["name", "type"]
                                            }
                                        },
                                        "returnType": { "type": "string" }
                                    },
                                    "required": ["name"]
                                }
                            }
                        },
                        "required": ["id", "name", "type"]
                    }
                },
                "relationships": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "from": { "type": "string" },
                            "to": { "type": "string" },
                            "type": {
                                "type": "string",
                                "enum": [
                                    "association", "inheritance", "implementation",
                                    "dependency", "aggregation", "composition"
                                ]
                            },
                            "multiplicity": {
                                "type": "object",
                                "properties": {
                                    "from": { "type": "string" },
                                    "to": { "type": "string" }
                                }
                            },
                            "name": { "type": "string" }
                        },
                        "required": ["id", "from", "to", "type"]
                    }
                }
            },
            "required": ["id", "name", "type"]
        });

        vec![
            ToolDefinition {
                name: "validate_mson_model".to_string(),
                description: Some(
                    "Check an MSON model for duplicate ids, relationships that reference \
                     unknown entities, invalid entity names and repeated members. \
                     Returns isValid plus a list of {message, severity} findings. \
                     Only 'error' findings make the model invalid."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "model": model_schema.clone()
                    },
                    "required": ["model"]
                }),
            },
            ToolDefinition {
                name: "convert_to_system_runtime".to_string(),
                description: Some(
                    "Convert an MSON model into a System Runtime bundle. Every entity \
                     becomes one schema (field -> property/link/collection/method) and one \
                     type model (field -> type; methods as {param: type, '=>': returnType}). \
                     Associations, aggregations and compositions add link or collection \
                     fields on both ends; inheritance and implementation extend _inherit. \
                     The bundle is validated unless validate is false."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "model": model_schema.clone(),
                        "version": {
                            "type": "string",
                            "description": "Optional: bundle version as MAJOR.MINOR.PATCH (default from configuration, normally 0.0.1)"
                        },
                        "master": {
                            "type": "boolean",
                            "description": "Optional: mark the bundle as the primary bundle"
                        },
                        "validate": {
                            "type": "boolean",
                            "description": "Optional: validate the generated bundle (default: true)"
                        }
                    },
                    "required": ["model"]
                }),
            },
            ToolDefinition {
                name: "validate_system_runtime_bundle".to_string(),
                description: Some(
                    "Validate a System Runtime bundle: structure first, then model/schema \
                     references, component classes, behavior owners, identity uniqueness, \
                     inheritance cycles and method signatures. All findings are reported \
                     in one pass."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "bundle": {
                            "type": "object",
                            "description": "The bundle JSON: {_id, name, description, version, master, schemas, models, types, behaviors, components}"
                        }
                    },
                    "required": ["bundle"]
                }),
            },
            ToolDefinition {
                name: "preview_entity".to_string(),
                description: Some(
                    "Show the schema and type model a single entity of an MSON model \
                     converts to, without building the whole bundle."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "model": model_schema,
                        "entity": {
                            "type": "string",
                            "description": "Entity id or name"
                        }
                    },
                    "required": ["model", "entity"]
                }),
            },
        ]
    }

    // ==================== Argument Decoding ====================

    /// Reads a JSON argument that may also arrive as a JSON-encoded string.
    /// `invalid` wraps the decode error of such a string.
    fn json_argument<'a>(
        arguments: &'a Value,
        name: &'static str,
        invalid: fn(serde_json::Error) -> ToolError,
    ) -> Result<Cow<'a, Value>, ToolError> {
        match arguments.get(name) {
            None | Some(Value::Null) => Err(ToolError::MissingParameter { name }),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map(Cow::Owned)
                .map_err(invalid),
            Some(value) => Ok(Cow::Borrowed(value)),
        }
    }

    /// Decodes the `model` argument.
    fn model_argument(arguments: &Value) -> Result<Model, ToolError> {
        let invalid = |source: serde_json::Error| ToolError::InvalidModel { source };
        let value = Self::json_argument(arguments, "model", invalid)?;
        Model::deserialize(&*value).map_err(invalid)
    }

    /// Decodes the optional `version` argument. Anything but a
    /// `MAJOR.MINOR.PATCH` string is rejected.
    fn version_argument(arguments: &Value) -> Result<Option<String>, ToolError> {
        match arguments.get("version") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(version)) if is_semantic_version(version) => {
                Ok(Some(version.clone()))
            }
            Some(Value::String(version)) => Err(ToolError::InvalidVersion {
                version: version.clone(),
            }),
            Some(other) => Err(ToolError::InvalidVersion {
                version: other.to_string(),
            }),
        }
    }

    // ==================== Tool Handlers ====================

    /// Checks a model and reports its findings.
    fn call_validate_mson_model(arguments: &Value) -> ToolCallResult {
        let model = match Self::model_argument(arguments) {
            Ok(model) => model,
            Err(e) => return e.into(),
        };

        let report = check_model(&model);

        let result = json!({
            "model": model.name,
            "entity_count": model.entities.len(),
            "relationship_count": model.relationships.len(),
            "isValid": report.is_valid,
            "warnings": report.warnings,
        });

        ToolCallResult::json(&result, false)
    }

    /// Converts a model into a bundle.
    fn call_convert_to_system_runtime(&self, arguments: &Value) -> ToolCallResult {
        let model = match Self::model_argument(arguments) {
            Ok(model) => model,
            Err(e) => return e.into(),
        };
        let version = match Self::version_argument(arguments) {
            Ok(version) => version.unwrap_or_else(|| self.settings.default_version.clone()),
            Err(e) => return e.into(),
        };
        let master = arguments
            .get("master")
            .and_then(Value::as_bool)
            .unwrap_or(self.settings.master);
        let should_validate = arguments
            .get("validate")
            .and_then(Value::as_bool)
            .unwrap_or(self.settings.validate_on_convert);

        let model_report = check_model(&model);
        if !model_report.is_valid {
            tracing::warn!(model = %model.name, "Conversion aborted: model has errors");
            let result = json!({
                "status": "error",
                "model": model.name,
                "error": "The MSON model has errors; fix them before converting",
                "warnings": model_report.warnings,
            });
            return ToolCallResult::json(&result, true);
        }

        let options = AssembleOptions {
            version: Some(version),
            master,
        };
        let bundle = assemble(&model, &options);

        let validation = should_validate.then(|| {
            let warnings = check_semantics(&bundle);
            json!({
                "isValid": !has_errors(&warnings),
                "warnings": warnings,
            })
        });

        let result = json!({
            "status": "success",
            "model": model.name,
            "schema_count": bundle.schemas.len(),
            "model_warnings": model_report.warnings,
            "validation": validation,
            "bundle": bundle,
        });

        ToolCallResult::json(&result, false)
    }

    /// Validates an externally supplied bundle.
    fn call_validate_bundle(arguments: &Value) -> ToolCallResult {
        let invalid = |source: serde_json::Error| ToolError::InvalidBundle { source };
        let candidate = match Self::json_argument(arguments, "bundle", invalid) {
            Ok(candidate) => candidate,
            Err(e) => return e.into(),
        };

        let report = validate_bundle(&candidate);

        match serde_json::to_value(&report) {
            Ok(result) => ToolCallResult::json(&result, false),
            Err(source) => ToolError::Serialisation { source }.into(),
        }
    }

    /// Converts a single entity, looked up by id first and then by name.
    fn call_preview_entity(arguments: &Value) -> ToolCallResult {
        let model = match Self::model_argument(arguments) {
            Ok(model) => model,
            Err(e) => return e.into(),
        };
        let Some(wanted) = arguments.get("entity").and_then(Value::as_str) else {
            return ToolError::MissingParameter { name: "entity" }.into();
        };

        let entity = model
            .entity(wanted)
            .or_else(|| model.entities.iter().find(|e| e.name == wanted));
        let Some(entity) = entity else {
            return ToolError::EntityNotFound {
                name: wanted.to_string(),
            }
            .into();
        };

        let result = json!({
            "entity": entity.name,
            "schema": to_schema(entity, &model.relationships, &model.entities),
            "model": to_model(entity, &model.relationships, &model.entities),
        });

        ToolCallResult::json(&result, false)
    }
}

/// Decodes the params of `req` into `T`.
fn decode_params<T: DeserializeOwned>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    let params = req.params.clone().ok_or_else(|| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params"))
    })?;
    serde_json::from_value(params).map_err(|e| {
        JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
    })
}

/// Resolves with the name of the first termination signal received.
#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => Ok("SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Resolves once Ctrl+C is pressed.
#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
