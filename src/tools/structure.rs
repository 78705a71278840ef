//! `get_code_structure` — outline of the types and members in a C# source.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{SourceArgs, ToolContext, with_source};
use crate::outline;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureParams {
    #[serde(flatten)]
    pub source: SourceArgs,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_code_structure".to_owned(),
        description: "List the classes, structs, interfaces, records and enums in a C# file \
            or session, each followed by its methods and properties, with line ranges, \
            signatures and modifiers."
            .to_owned(),
        input_schema: with_source(serde_json::json!({
            "type": "object",
            "properties": {}
        })),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: StructureParams =
        serde_json::from_value(arguments).context("invalid get_code_structure parameters")?;
    let source = ctx.source(params.source)?;
    let text = source.read(&ctx.sessions)?;
    let items = outline::extract(&text)?;
    ToolCallResult::json(&items)
}
