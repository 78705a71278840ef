//! `find_definitions` / `find_references` — regex symbol search over a tree.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::ToolContext;
use crate::index::{find_definitions, find_references};
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolParams {
    /// Directory (or single file) to search.
    pub path: String,
    pub symbol: String,
}

fn symbol_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "path": {
                "type": "string",
                "description": "Directory or .cs file to search"
            },
            "symbol": {
                "type": "string",
                "description": "Identifier to look for"
            }
        },
        "required": ["path", "symbol"]
    })
}

pub fn definitions_definition() -> ToolDefinition {
    ToolDefinition {
        name: "find_definitions".to_owned(),
        description: "Find lines in .cs files that look like a declaration of a symbol \
            (type, method or property). Text heuristic: call sites such as `Foo(1);` are \
            also reported as methods."
            .to_owned(),
        input_schema: symbol_schema(),
    }
}

pub fn references_definition() -> ToolDefinition {
    ToolDefinition {
        name: "find_references".to_owned(),
        description: "Find every whole-word occurrence of a symbol in .cs files, one result \
            per occurrence, including comments and strings."
            .to_owned(),
        input_schema: symbol_schema(),
    }
}

pub fn execute_definitions(
    ctx: &ToolContext,
    arguments: serde_json::Value,
) -> Result<ToolCallResult> {
    let params: SymbolParams =
        serde_json::from_value(arguments).context("invalid find_definitions parameters")?;
    let root = ctx.resolve(&params.path)?;
    let report = find_definitions(&root, &params.symbol, &ctx.scan)?;
    ToolCallResult::json(&report)
}

pub fn execute_references(
    ctx: &ToolContext,
    arguments: serde_json::Value,
) -> Result<ToolCallResult> {
    let params: SymbolParams =
        serde_json::from_value(arguments).context("invalid find_references parameters")?;
    let root = ctx.resolve(&params.path)?;
    let report = find_references(&root, &params.symbol, &ctx.scan)?;
    ToolCallResult::json(&report)
}
