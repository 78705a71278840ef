//! Tool router — registers and dispatches MCP tool calls.
//!
//! Each tool module exposes `tool_definition()` (name, description, JSON
//! Schema) and `execute()`, which parses camelCase arguments and returns a
//! [`ToolCallResult`]. Failures propagate as errors; the server turns them
//! into `isError` replies tagged with the error kind.

pub mod imports;
pub mod method;
pub mod namespace;
pub mod projects;
pub mod razor;
pub mod session;
pub mod structure;
pub mod symbols;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ErrorKind, SurgeonError, SurgeonResult};
use crate::index::ScanOptions;
use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::SessionStore;
use crate::source::SourceRef;

/// Resolve `raw` against `workspace` and make sure it stays inside it.
///
/// Rejects null bytes, `..` escapes and symlinks that lead outside the
/// workspace. Paths that do not exist yet are resolved through their
/// deepest existing ancestor.
pub fn validate_path(workspace: &Path, raw: &str) -> SurgeonResult<PathBuf> {
    if raw.contains('\0') {
        return Err(SurgeonError::argument("path contains null byte"));
    }
    if raw.trim().is_empty() {
        return Err(SurgeonError::argument("path is empty"));
    }

    let joined = if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        workspace.join(raw)
    };
    let root = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());
    let resolved = resolve_existing_prefix(&joined)?;

    if !resolved.starts_with(&root) {
        return Err(SurgeonError::argument(format!(
            "path escapes workspace boundary: {raw}"
        )));
    }
    Ok(resolved)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// missing tail.
fn resolve_existing_prefix(path: &Path) -> SurgeonResult<PathBuf> {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        if existing.exists() {
            let mut resolved = existing
                .canonicalize()
                .map_err(|e| SurgeonError::io(existing, e))?;
            resolved.extend(tail.iter().rev());
            return Ok(resolved);
        }
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => {
                return Err(SurgeonError::argument(format!(
                    "cannot resolve path {}",
                    path.display()
                )));
            }
        }
    }
}

/// `sessionId` / `path` pair shared by the tools that accept either.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceArgs {
    pub session_id: Option<String>,
    pub path: Option<String>,
}

/// Add the `sessionId` / `path` properties to an object schema.
pub(crate) fn with_source(mut schema: Value) -> Value {
    if let Some(properties) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        properties.insert(
            "sessionId".to_owned(),
            serde_json::json!({
                "type": "string",
                "description": "Edit session to operate on (give either sessionId or path)"
            }),
        );
        properties.insert(
            "path".to_owned(),
            serde_json::json!({
                "type": "string",
                "description": "C# file to operate on, relative to the workspace (give either sessionId or path)"
            }),
        );
    }
    schema
}

/// State shared by every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub workspace: PathBuf,
    pub sessions: Arc<SessionStore>,
    pub scan: ScanOptions,
}

impl ToolContext {
    pub fn resolve(&self, raw: &str) -> SurgeonResult<PathBuf> {
        validate_path(&self.workspace, raw)
    }

    /// Resolve an optional path, defaulting to the workspace root.
    pub fn resolve_or_root(&self, raw: Option<&str>) -> SurgeonResult<PathBuf> {
        self.resolve(raw.unwrap_or("."))
    }

    /// Turn [`SourceArgs`] into a [`SourceRef`], validating the path.
    pub fn source(&self, args: SourceArgs) -> SurgeonResult<SourceRef> {
        let path = args.path.as_deref().map(|p| self.resolve(p)).transpose()?;
        SourceRef::from_parts(args.session_id, path)
    }
}

/// Tool router that dispatches MCP tool calls to implementations.
pub struct ToolRouter {
    ctx: ToolContext,
}

impl ToolRouter {
    pub fn new(workspace: PathBuf, sessions: Arc<SessionStore>, scan: ScanOptions) -> Self {
        Self {
            ctx: ToolContext {
                workspace,
                sessions,
                scan,
            },
        }
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            structure::tool_definition(),
            method::get_definition(),
            method::update_definition(),
            imports::tool_definition(),
            namespace::tool_definition(),
            session::start_definition(),
            session::get_definition(),
            session::update_definition(),
            session::save_definition(),
            session::close_definition(),
            session::list_definition(),
            symbols::definitions_definition(),
            symbols::references_definition(),
            projects::tool_definition(),
            razor::tool_definition(),
        ]
    }

    /// Call a tool by name with the given JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid or the operation fails.
    pub fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResult> {
        debug!(tool = name, "dispatching tool call");
        let ctx = &self.ctx;

        match name {
            "get_code_structure" => structure::execute(ctx, arguments),
            "get_method" => method::execute_get(ctx, arguments),
            "update_method" => method::execute_update(ctx, arguments),
            "add_using" => imports::execute(ctx, arguments),
            "fix_namespace" => namespace::execute(ctx, arguments),
            "start_session" => session::execute_start(ctx, arguments),
            "get_session" => session::execute_get(ctx, arguments),
            "update_session" => session::execute_update(ctx, arguments),
            "save_session" => session::execute_save(ctx, arguments),
            "close_session" => session::execute_close(ctx, arguments),
            "list_sessions" => session::execute_list(ctx),
            "find_definitions" => symbols::execute_definitions(ctx, arguments),
            "find_references" => symbols::execute_references(ctx, arguments),
            "list_projects" => projects::execute(ctx, arguments),
            "split_razor" => razor::execute(ctx, arguments),
            _ => Ok(ToolCallResult::error(
                ErrorKind::ArgumentError,
                format!("unknown tool: {name}"),
            )),
        }
    }
}
