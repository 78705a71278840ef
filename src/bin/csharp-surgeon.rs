//! csharp-surgeon -- MCP server for structural C# edits.
//!
//! Usage: csharp-surgeon [--workspace <path>] [--max-depth <n>]

use anyhow::Context;

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .skip_while(|a| *a != flag)
        .nth(1)
        .cloned()
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let workspace = flag_value(&args, "--workspace").unwrap_or_else(|| ".".to_string());
    let workspace = std::path::Path::new(&workspace)
        .canonicalize()
        .with_context(|| format!("workspace {workspace} is not accessible"))?;

    let mut scan = csharp_surgeon::index::ScanOptions::default();
    if let Some(depth) = flag_value(&args, "--max-depth") {
        scan.max_depth = depth
            .parse()
            .with_context(|| format!("--max-depth expects a number, got {depth}"))?;
    }

    let config = csharp_surgeon::McpServerConfig { workspace, scan };
    csharp_surgeon::run_mcp_server(config)
}
