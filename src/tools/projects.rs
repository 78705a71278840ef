//! `list_projects` — project manifests and their project references.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::index::list_projects;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsParams {
    /// Directory or `.sln`/`.slnx` file; defaults to the workspace.
    #[serde(default)]
    pub path: Option<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_projects".to_owned(),
        description: "List every .csproj under a directory (or next to a solution file) \
            with the names of the projects it references."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory or .sln/.slnx file (default: workspace root)"
                }
            }
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: ListProjectsParams =
        serde_json::from_value(arguments).context("invalid list_projects parameters")?;
    let root = ctx.resolve_or_root(params.path.as_deref())?;
    let report = list_projects(&root, &ctx.scan)?;
    ToolCallResult::json(&report)
}
