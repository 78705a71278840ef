//! `split_razor` — move a component's code and styles into sibling files.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::edit::expected_namespace;
use crate::razor::split_razor;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRazorParams {
    pub path: String,
    #[serde(default)]
    pub project_root: Option<String>,
    #[serde(default)]
    pub root_namespace: Option<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "split_razor".to_owned(),
        description: "Split a .razor component: the @code block becomes a partial class in \
            <Name>.razor.cs and the <style> block becomes <Name>.razor.css. The namespace \
            comes from @namespace, else from rootNamespace plus the folder path relative to \
            projectRoot. Existing code-behind or CSS files are not overwritten."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The .razor file to split"
                },
                "projectRoot": {
                    "type": "string",
                    "description": "Folder that corresponds to rootNamespace (default: workspace root)"
                },
                "rootNamespace": {
                    "type": "string",
                    "description": "Root namespace used when the component has no @namespace"
                }
            },
            "required": ["path"]
        }),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: SplitRazorParams =
        serde_json::from_value(arguments).context("invalid split_razor parameters")?;
    let razor_path = ctx.resolve(&params.path)?;

    let hint = match params.root_namespace.as_deref() {
        Some(root_namespace) => {
            let project_root = ctx.resolve_or_root(params.project_root.as_deref())?;
            Some(expected_namespace(&razor_path, &project_root, root_namespace)?)
        }
        None => None,
    };

    let split = split_razor(&razor_path, hint.as_deref())?;
    ToolCallResult::json(&split)
}
