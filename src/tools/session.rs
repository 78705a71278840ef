//! Session tools — open, edit, save, close and list in-memory buffers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ToolContext;
use crate::server::{ToolCallResult, ToolDefinition};
use crate::session::Session;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionParams {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionParams {
    pub session_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdParams {
    pub session_id: String,
}

/// Session metadata without the buffer itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub file_path: Option<PathBuf>,
    pub is_dirty: bool,
    pub last_modified: DateTime<Utc>,
    pub length: usize,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            file_path: session.file_path.clone(),
            is_dirty: session.is_dirty,
            last_modified: session.last_modified,
            length: session.content.len(),
        }
    }
}

fn session_id_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "sessionId": {
                "type": "string",
                "description": description
            }
        },
        "required": ["sessionId"]
    })
}

pub fn start_definition() -> ToolDefinition {
    ToolDefinition {
        name: "start_session".to_owned(),
        description: "Open an in-memory editing session. With a path, the file's current \
            text is loaded (a missing file starts empty and is created on save). Edits made \
            through the session stay in memory until save_session."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File backing the session (optional)"
                }
            }
        }),
    }
}

pub fn get_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_session".to_owned(),
        description: "Return a session's id, file, full content, dirty flag and \
            last-modified time."
            .to_owned(),
        input_schema: session_id_schema("Session to read"),
    }
}

pub fn update_definition() -> ToolDefinition {
    ToolDefinition {
        name: "update_session".to_owned(),
        description: "Replace a session's entire content.".to_owned(),
        input_schema: {
            let mut schema = session_id_schema("Session to update");
            schema["properties"]["content"] = serde_json::json!({
                "type": "string",
                "description": "New content"
            });
            schema["required"] = serde_json::json!(["sessionId", "content"]);
            schema
        },
    }
}

pub fn save_definition() -> ToolDefinition {
    ToolDefinition {
        name: "save_session".to_owned(),
        description: "Write a session's content to its file and clear the dirty flag."
            .to_owned(),
        input_schema: session_id_schema("Session to save"),
    }
}

pub fn close_definition() -> ToolDefinition {
    ToolDefinition {
        name: "close_session".to_owned(),
        description: "Discard a session without saving. Closing an unknown session is a no-op."
            .to_owned(),
        input_schema: session_id_schema("Session to close"),
    }
}

pub fn list_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_sessions".to_owned(),
        description: "List open sessions with their file, dirty flag and size.".to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn execute_start(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: StartSessionParams =
        serde_json::from_value(arguments).context("invalid start_session parameters")?;
    let path = params.path.as_deref().map(|p| ctx.resolve(p)).transpose()?;
    let session = ctx.sessions.create(path.as_deref())?;
    ToolCallResult::json(&SessionSummary::from(&session))
}

pub fn execute_get(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: SessionIdParams =
        serde_json::from_value(arguments).context("invalid get_session parameters")?;
    ToolCallResult::json(&ctx.sessions.get(&params.session_id)?)
}

pub fn execute_update(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: UpdateSessionParams =
        serde_json::from_value(arguments).context("invalid update_session parameters")?;
    let bytes = params.content.len();
    ctx.sessions.update_content(&params.session_id, params.content)?;
    Ok(ToolCallResult::text(format!(
        "Session {} updated ({bytes} bytes)",
        params.session_id
    )))
}

pub fn execute_save(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: SessionIdParams =
        serde_json::from_value(arguments).context("invalid save_session parameters")?;
    let path = ctx.sessions.save(&params.session_id)?;
    Ok(ToolCallResult::text(format!(
        "Session {} saved to {}",
        params.session_id,
        path.display()
    )))
}

pub fn execute_close(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: SessionIdParams =
        serde_json::from_value(arguments).context("invalid close_session parameters")?;
    ctx.sessions.close(&params.session_id);
    Ok(ToolCallResult::text(format!(
        "Session {} closed",
        params.session_id
    )))
}

pub fn execute_list(ctx: &ToolContext) -> Result<ToolCallResult> {
    let summaries: Vec<SessionSummary> =
        ctx.sessions.list().iter().map(SessionSummary::from).collect();
    ToolCallResult::json(&summaries)
}
