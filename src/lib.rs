//! `csharp-surgeon` — structural editing and indexing of C# source.
//!
//! Reads C# with a tree-sitter grammar and applies narrowly targeted edits
//! whose effect outside the edited node is byte-for-byte nil. Alongside the
//! syntax-aware operations sit cheap regex/XML indexers for whole
//! directories, and an in-memory session store for staging edits before
//! they reach disk. Everything is exposed as MCP tools over stdio
//! (JSON-RPC 2.0, newline-delimited).
//!
//! # Modules
//!
//! - [`outline`] — type/member outline and method body extraction
//! - [`edit`] — method body replacement, `using` insertion, namespace fixes
//! - [`session`] — in-memory edit sessions
//! - [`index`] — definition/reference search and project manifests
//! - [`razor`] — split Razor components into code-behind and CSS
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → server::serve → ToolRouter → outline / edit / index / razor
//!                                        ↓
//!                                   SessionStore
//! stdout (JSON-RPC) ←─────────────────────┘
//! ```

pub mod edit;
pub mod error;
pub mod index;
pub mod model;
pub mod outline;
pub mod razor;
pub mod server;
pub mod session;
pub mod source;
pub mod syntax;
pub mod tools;
pub mod util;

pub use error::{ErrorKind, SurgeonError, SurgeonResult};
pub use server::{McpServerConfig, run_mcp_server, serve};
pub use session::{Session, SessionStore};
pub use source::SourceRef;
