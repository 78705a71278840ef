//! MCP Server — stdio transport, JSON-RPC 2.0, newline-delimited.
//!
//! Exposes the structural edit and index operations as MCP tools
//! (protocol 2025-06-18). One request per line in, one response per line
//! out; notifications get no reply.
//!
//! Protocol flow:
//! 1. Client sends `initialize` → server responds with capabilities
//! 2. Client sends `notifications/initialized`
//! 3. Client sends `tools/list` → server returns tool definitions
//! 4. Client sends `tools/call` → server executes tool and returns result
//! 5. Client closes stdin → server exits

use std::io::{BufRead, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{ErrorKind, SurgeonError};
use crate::index::ScanOptions;
use crate::session::SessionStore;
use crate::tools::ToolRouter;

/// Maximum size of a single JSON-RPC line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

const PROTOCOL_VERSION: &str = "2025-06-18";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsCapability {
    list_changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
}

/// MCP tool definition for tools/list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// MCP content item in tools/call response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// MCP tools/call result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Successful reply carrying one text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text: text.into(),
            }],
            is_error: false,
        }
    }

    /// Successful reply carrying `value` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json(value: &impl Serialize) -> Result<Self> {
        let text = serde_json::to_string_pretty(value).context("failed to serialize tool result")?;
        Ok(Self::text(text))
    }

    /// Failed reply; the text is prefixed with the error kind tag.
    pub fn error(kind: ErrorKind, message: impl std::fmt::Display) -> Self {
        Self {
            is_error: true,
            ..Self::text(format!("[{}] {message}", kind.tag()))
        }
    }
}

// ---------------------------------------------------------------------------
// MCP Server configuration
// ---------------------------------------------------------------------------

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Root that every tool path is resolved against and confined to.
    pub workspace: PathBuf,
    /// Limits applied to directory scans.
    pub scan: ScanOptions,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            scan: ScanOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server main loop
// ---------------------------------------------------------------------------

/// Run the MCP server on stdin/stdout until stdin is closed.
///
/// # Errors
///
/// Returns an error if stdin/stdout I/O fails fatally.
pub fn run_mcp_server(config: McpServerConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        max_depth = config.scan.max_depth,
        "csharp-surgeon MCP server starting"
    );

    let sessions = Arc::new(SessionStore::new());
    let router = ToolRouter::new(config.workspace, sessions, config.scan);
    let stdin = std::io::stdin();
    serve(&router, stdin.lock(), std::io::stdout().lock())?;

    info!("csharp-surgeon MCP server stopped");
    Ok(())
}

/// Serve requests read from `reader`, writing responses to `writer`,
/// until `reader` reaches EOF.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn serve(router: &ToolRouter, mut reader: impl BufRead, mut writer: impl Write) -> Result<()> {
    loop {
        let line = match read_frame(&mut reader, MAX_LINE_BYTES)? {
            Frame::Eof => {
                info!("input closed, shutting down");
                return Ok(());
            }
            Frame::Oversized => {
                warn!(limit = MAX_LINE_BYTES, "request line too long, discarded");
                let resp = error_response(
                    None,
                    -32700,
                    &format!("parse error: line exceeds maximum size ({MAX_LINE_BYTES} bytes)"),
                );
                write_response(&mut writer, &resp)?;
                continue;
            }
            Frame::Line(line) => line,
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(raw = trimmed, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                let resp = error_response(None, -32700, &format!("parse error: {e}"));
                write_response(&mut writer, &resp)?;
                continue;
            }
        };

        if request.jsonrpc != "2.0" {
            warn!(version = request.jsonrpc, "invalid JSON-RPC version");
            let resp = error_response(
                request.id.clone(),
                -32600,
                &format!(
                    "invalid request: jsonrpc version must be \"2.0\", got \"{}\"",
                    request.jsonrpc
                ),
            );
            write_response(&mut writer, &resp)?;
            continue;
        }

        let response = dispatch(router, &request);
        if request.id.is_none() {
            debug!(method = request.method, "notification handled (no response)");
            continue;
        }
        if let Some(resp) = response {
            write_response(&mut writer, &resp)?;
        }
    }
}

fn dispatch(router: &ToolRouter, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    match req.method.as_str() {
        "initialize" => Some(handle_initialize(req)),
        "notifications/initialized" => {
            info!("client initialized");
            None
        }
        "tools/list" => Some(handle_tools_list(router, req)),
        "tools/call" => Some(handle_tools_call(router, req)),
        "ping" => Some(success_response(req.id.clone(), &serde_json::json!({}))),
        _ => {
            warn!(method = req.method, "unknown method");
            Some(error_response(
                req.id.clone(),
                -32601,
                &format!("method not found: {}", req.method),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_initialize(req: &JsonRpcRequest) -> JsonRpcResponse {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_owned(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
        },
        server_info: ServerInfo {
            name: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        },
    };

    success_response(req.id.clone(), &result)
}

fn handle_tools_list(router: &ToolRouter, req: &JsonRpcRequest) -> JsonRpcResponse {
    let result = ToolsListResult {
        tools: router.list_tools(),
    };
    success_response(req.id.clone(), &result)
}

fn handle_tools_call(router: &ToolRouter, req: &JsonRpcRequest) -> JsonRpcResponse {
    let params: ToolCallParams = match serde_json::from_value(req.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return error_response(
                req.id.clone(),
                -32602,
                &format!("invalid tools/call params: {e}"),
            );
        }
    };

    let result = router
        .call_tool(&params.name, params.arguments)
        .unwrap_or_else(|e| {
            let kind = error_kind(&e);
            error!(tool = params.name, kind = kind.tag(), error = %format!("{e:#}"), "tool call failed");
            ToolCallResult::error(kind, format!("{e:#}"))
        });
    success_response(req.id.clone(), &result)
}

/// Kind of the [`SurgeonError`] behind `err`; anything else (malformed
/// arguments, mostly) counts as an argument error.
fn error_kind(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<SurgeonError>()
        .map_or(ErrorKind::ArgumentError, SurgeonError::kind)
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn success_response(id: Option<serde_json::Value>, result: &impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse {
            jsonrpc: "2.0".to_owned(),
            id,
            result: Some(v),
            error: None,
        },
        Err(e) => {
            error!(error = %e, "failed to serialize success response");
            error_response(
                id,
                -32603,
                &format!("internal error: failed to serialize result: {e}"),
            )
        }
    }
}

fn error_response(id: Option<serde_json::Value>, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_owned(),
            data: None,
        }),
    }
}

/// Write a JSON-RPC response as a single line.
fn write_response(out: &mut impl Write, resp: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(resp).context("failed to serialize response")?;
    debug!(response = json, "sending response");
    out.write_all(json.as_bytes())
        .context("failed to write response")?;
    out.write_all(b"\n").context("failed to write newline")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Eof,
    Line(String),
    Oversized,
}

/// Read one newline-terminated frame of at most `max_bytes`.
///
/// An oversized line is consumed through its newline and reported as
/// [`Frame::Oversized`] so the next request still lines up.
fn read_frame(reader: &mut impl BufRead, max_bytes: usize) -> Result<Frame> {
    let mut buf = Vec::new();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let read = reader
        .by_ref()
        .take(limit)
        .read_until(b'\n', &mut buf)
        .context("failed to read request line")?;

    if read == 0 {
        return Ok(Frame::Eof);
    }
    if buf.len() > max_bytes && buf.last() != Some(&b'\n') {
        reader
            .skip_until(b'\n')
            .context("failed to discard oversized line")?;
        return Ok(Frame::Oversized);
    }
    Ok(Frame::Line(String::from_utf8_lossy(&buf).into_owned()))
}
