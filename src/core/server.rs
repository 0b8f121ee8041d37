/// MCP Server Implementation
///
/// This module contains the core MCP server implementation including:
/// - JSON-RPC 2.0 request/response structures
/// - Tool registry for managing available tools
/// - Request dispatch for MCP protocol methods (shared by both transports)
/// - HTTP server setup with Actix Web

use actix_web::{
    App, HttpResponse, HttpServer,
    http::header,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::ServerConfig;
use crate::core::error::ToolError;
use crate::core::reporter::{Reporter, TracingReporter};
use crate::tools;

/// Service identifier reported by the health endpoint
pub const SERVICE_NAME: &str = "mcp-echo";

/// Protocol revisions this server can speak, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

// JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Largest accepted HTTP request body, matching Actix Web's JSON extractor default
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Server metadata shared across all worker threads and transports.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server name as reported in MCP initialize responses
    pub server_name: String,
    /// Server version string as reported in MCP initialize responses
    pub server_version: String,
}

impl AppState {
    pub fn new(server_name: impl Into<String>, server_version: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
        }
    }
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// id is None only when the member is absent (a notification, which never
/// receives a response). An explicit `"id": null` is kept as `Some(Value::Null)`.
#[derive(Deserialize, Debug, Clone)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    #[allow(dead_code)]
    #[serde(default)]
    jsonrpc: String,
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Any id member that is present, null included, marks a request.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Exactly one of result or error is present.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MCPResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// MCP tool definition structure, serialized as-is by tools/list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MCPTool {
    pub name: String,
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// JSON Schema describing the tool's structured result
    #[serde(rename = "outputSchema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

/// A callable MCP tool.
///
/// Tools are stateless: each call receives its arguments and a reporting
/// channel and returns a fresh JSON result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema advertised by tools/list
    fn definition(&self) -> MCPTool;

    /// Execute the tool with the client's arguments
    async fn call(&self, args: Value, reporter: &dyn Reporter) -> Result<Value, ToolError>;
}

/// Shared handle to a registered tool.
pub type ToolHandler = Arc<dyn Tool>;

/// Registry of available MCP tools.
///
/// Keeps definitions in registration order for discovery and a name index
/// for execution. Built once at startup and read-only afterwards.
pub struct ToolRegistry {
    pub tools: Vec<MCPTool>,
    pub handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool, replacing any earlier tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let definition = tool.definition();
        let name = definition.name.clone();
        self.tools.retain(|t| t.name != name);
        self.tools.push(definition);
        self.handlers.insert(name, Arc::new(tool));
    }

    /// Invoke a tool by name.
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        reporter: &dyn Reporter,
    ) -> Result<Value, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        handler.call(args, reporter).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the tool registry with every tool this server exposes.
pub fn initialize_tools() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    tools::register_all(&mut registry);
    Arc::new(registry)
}

/// Parse a raw JSON-RPC message.
///
/// On failure returns the error response to send back: parse error for
/// malformed JSON, invalid request for JSON that is not a request object.
pub fn parse_request(raw: &[u8]) -> Result<MCPRequest, MCPResponse> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| MCPResponse::failure(None, PARSE_ERROR, format!("Parse error: {}", e)))?;
    let id = value.get("id").cloned().filter(|id| !id.is_null());
    serde_json::from_value(value).map_err(|e| {
        MCPResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

/// Route a JSON-RPC request to the matching MCP method handler.
///
/// Returns None for notifications (requests without an id).
pub async fn handle_request(
    state: &AppState,
    registry: &ToolRegistry,
    req: MCPRequest,
    reporter: &dyn Reporter,
) -> Option<MCPResponse> {
    let Some(id) = req.id else {
        tracing::debug!(method = %req.method, "Received notification");
        return None;
    };

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(state, Some(id), req.params.as_ref()),
        "ping" => MCPResponse::success(Some(id), json!({})),
        "tools/list" => handle_tools_list(registry, Some(id)),
        "tools/call" => handle_tools_call(registry, Some(id), req.params, reporter).await,
        _ => {
            tracing::debug!(method = %req.method, "Method not found");
            MCPResponse::failure(
                Some(id),
                METHOD_NOT_FOUND,
                format!("Method not found: {}", req.method),
            )
        }
    };
    Some(response)
}

/// Pick the protocol revision to answer with.
///
/// Echoes the client's version when supported, otherwise offers the newest.
fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v).copied())
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

/// Handle MCP initialize method.
fn handle_initialize(state: &AppState, id: Option<Value>, params: Option<&Value>) -> MCPResponse {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let version = negotiate_protocol_version(requested);
    tracing::info!(
        client_version = requested.unwrap_or("none"),
        protocol_version = version,
        "Client initializing"
    );

    MCPResponse::success(
        id,
        json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": {},
                "logging": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

/// Handle MCP tools/list method.
fn handle_tools_list(registry: &ToolRegistry, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(id, json!({ "tools": registry.tools }))
}

/// Handle MCP tools/call method.
///
/// Unknown tools are a protocol error; argument validation failures are
/// returned as a tool result with isError set so the client can show them.
async fn handle_tools_call(
    registry: &ToolRegistry,
    id: Option<Value>,
    params: Option<Value>,
    reporter: &dyn Reporter,
) -> MCPResponse {
    let Some(params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params");
    };

    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: missing tool name");
    };

    // Arguments default to an empty object when omitted
    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    tracing::info!(tool = tool_name, "Calling tool");
    match registry.call(tool_name, arguments, reporter).await {
        Ok(result) => MCPResponse::success(
            id,
            json!({
                "content": [
                    {
                        "type": "text",
                        "text": serde_json::to_string_pretty(&result).unwrap_or_default()
                    }
                ],
                "structuredContent": result,
                "isError": false
            }),
        ),
        Err(e @ ToolError::UnknownTool(_)) => {
            tracing::warn!(tool = tool_name, "Unknown tool requested");
            MCPResponse::failure(id, INVALID_PARAMS, e.to_string())
        }
        Err(e) => {
            tracing::warn!(tool = tool_name, error = %e, "Tool call failed");
            MCPResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": format!("Error: {}", e)
                        }
                    ],
                    "isError": true
                }),
            )
        }
    }
}

/// Health check endpoint handler.
///
/// Used by load balancers and orchestrators as a liveness probe.
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME
    }))
}

/// MCP JSON-RPC request handler.
///
/// The body is parsed by hand so malformed requests get a JSON-RPC error
/// instead of Actix Web's plain-text 400.
async fn mcp_handler(
    state: web::Data<AppState>,
    registry: web::Data<ToolRegistry>,
    body: Bytes,
) -> HttpResponse {
    let req = match parse_request(&body) {
        Ok(req) => req,
        Err(error_response) => {
            tracing::warn!("Rejected malformed JSON-RPC request");
            return HttpResponse::BadRequest().json(error_response);
        }
    };

    match handle_request(&state, &registry, req, &TracingReporter).await {
        Some(response) => HttpResponse::Ok().json(response),
        // Notifications are acknowledged without a body
        None => HttpResponse::Accepted().finish(),
    }
}

/// GET on the MCP endpoint would open a server-to-client stream, which this
/// server does not offer.
async fn mcp_stream_not_supported() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .finish()
}

/// Register all HTTP routes. Expects `web::Data<AppState>` and
/// `web::Data<ToolRegistry>` to be provided as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .route("/health", web::get().to(health))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/mcp", web::get().to(mcp_stream_not_supported))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Worker threads from configuration
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(
    config: &ServerConfig,
    state: AppState,
    registry: Arc<ToolRegistry>,
) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = config.bind_addr();
    let app_state = web::Data::new(state);
    let tool_registry = web::Data::from(registry);

    tracing::info!(
        name = %app_state.server_name,
        version = %app_state.server_version,
        bind_addr = %bind_addr,
        workers = config.workers,
        tools = tool_registry.tools.len(),
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(tool_registry.clone())
            // Enable compression for JSON responses (gzip/brotli)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}
