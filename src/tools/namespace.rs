//! `fix_namespace` — align declared namespaces with folder layout.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::edit::fix_namespaces;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixNamespaceParams {
    /// Directory to sweep.
    pub path: String,
    pub root_namespace: String,
    /// Folder that maps to `rootNamespace`; defaults to `path`.
    #[serde(default)]
    pub project_root: Option<String>,
    #[serde(default)]
    pub extra_usings: Vec<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "fix_namespace".to_owned(),
        description: "Rewrite the namespace of every .cs file under a directory to \
            rootNamespace plus the file's folder path relative to projectRoot, and add any \
            extraUsings. Files that fail are reported and skipped; the rest are still fixed."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to sweep"
                },
                "rootNamespace": {
                    "type": "string",
                    "description": "Namespace of the project root folder, e.g. MyApp"
                },
                "projectRoot": {
                    "type": "string",
                    "description": "Folder that corresponds to rootNamespace (default: path)"
                },
                "extraUsings": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Namespaces to import in every file"
                }
            },
            "required": ["path", "rootNamespace"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: FixNamespaceParams =
        serde_json::from_value(arguments).context("invalid fix_namespace parameters")?;
    let dir = ctx.resolve(&params.path)?;
    let project_root = match params.project_root.as_deref() {
        Some(root) => ctx.resolve(root)?,
        None => dir.clone(),
    };

    let report = fix_namespaces(
        &dir,
        &project_root,
        &params.root_namespace,
        &params.extra_usings,
        &ctx.scan,
    )?;
    ToolCallResult::json(&report)
}
