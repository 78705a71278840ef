//! `add_using` — ensure a `using` directive is present.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{SourceArgs, ToolContext, with_source};
use crate::edit::diff::describe_edit;
use crate::edit::ensure_import;
use crate::server::{ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsingParams {
    #[serde(flatten)]
    pub source: SourceArgs,
    /// Namespace to import, e.g. `System.Linq`.
    pub namespace: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "add_using".to_owned(),
        description: "Add `using <namespace>;` after the existing using directives unless it \
            is already imported. Idempotent. Returns a unified diff."
            .to_owned(),
        input_schema: with_source(serde_json::json!({
            "type": "object",
            "properties": {
                "namespace": {
                    "type": "string",
                    "description": "Namespace to import, e.g. System.Linq"
                }
            },
            "required": ["namespace"]
        })),
    }
}

pub fn execute(ctx: &ToolContext, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: AddUsingParams =
        serde_json::from_value(arguments).context("invalid add_using parameters")?;
    let source = ctx.source(params.source)?;
    let outcome = source.apply(&ctx.sessions, |text| ensure_import(text, &params.namespace))?;
    Ok(ToolCallResult::text(describe_edit(
        &source.label(),
        &outcome.before,
        &outcome.after,
    )))
}
