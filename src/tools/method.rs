//! `get_method` / `update_method` — read or replace one method's body.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{SourceArgs, ToolContext, with_source};
use crate::edit::diff::describe_edit;
use crate::edit::replace_method_body;
use crate::outline;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMethodParams {
    #[serde(flatten)]
    pub source: SourceArgs,
    pub method_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMethodParams {
    #[serde(flatten)]
    pub source: SourceArgs,
    pub method_name: String,
    /// Statements for the new body, without the enclosing braces.
    pub new_body: String,
}

pub fn get_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_method".to_owned(),
        description: "Return the body of the first method with the given name, braces \
            included (or the `=> expression` of an expression-bodied method)."
            .to_owned(),
        input_schema: with_source(serde_json::json!({
            "type": "object",
            "properties": {
                "methodName": {
                    "type": "string",
                    "description": "Simple name of the method"
                }
            },
            "required": ["methodName"]
        })),
    }
}

pub fn update_definition() -> ToolDefinition {
    ToolDefinition {
        name: "update_method".to_owned(),
        description: "Replace the body of the first method with the given name. `newBody` \
            is a list of C# statements without braces; it must parse on its own. \
            Everything outside the method body is left byte-for-byte unchanged. \
            Returns a unified diff."
            .to_owned(),
        input_schema: with_source(serde_json::json!({
            "type": "object",
            "properties": {
                "methodName": {
                    "type": "string",
                    "description": "Simple name of the method"
                },
                "newBody": {
                    "type": "string",
                    "description": "Statements of the new body, without the enclosing braces"
                }
            },
            "required": ["methodName", "newBody"]
        })),
    }
}

pub fn execute_get(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: GetMethodParams =
        serde_json::from_value(arguments).context("invalid get_method parameters")?;
    let source = ctx.source(params.source)?;
    let text = source.read(&ctx.sessions)?;
    let body = outline::method_body(&text, &params.method_name)?;
    Ok(ToolCallResult::text(body))
}

pub fn execute_update(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: UpdateMethodParams =
        serde_json::from_value(arguments).context("invalid update_method parameters")?;
    let source = ctx.source(params.source)?;

    let outcome = source.apply(&ctx.sessions, |text| {
        replace_method_body(text, &params.method_name, &params.new_body)
    })?;
    tracing::info!(
        target_source = %source.label(),
        method = params.method_name,
        "method body replaced"
    );
    Ok(ToolCallResult::text(describe_edit(
        &source.label(),
        &outcome.before,
        &outcome.after,
    )))
}
