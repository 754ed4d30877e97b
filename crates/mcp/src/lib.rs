//! MCP server core for the AgentX Dify bridge.
//!
//! Exposes a set of remote Dify workflow applications, each addressed by
//! its own API key, as MCP tools over stdio. Two operations carry all of
//! the logic:
//!
//! - `tools/list` rebuilds the tool catalog from the backend: per
//!   credential, the application's metadata and input form are fetched and
//!   translated into a tool descriptor. A failing credential is logged and
//!   skipped without affecting the rest of the catalog.
//! - `tools/call` resolves the tool name back to the credential recorded
//!   by the most recent catalog build, runs the workflow in blocking mode,
//!   and returns the normalized result as a single text content item.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod schema;
pub mod server;

pub use catalog::{Catalog, ToolDescriptor, ToolMetadata};
pub use config::{ConfigError, Settings};
pub use dispatch::{DispatchError, invoke};
pub use server::{AgentxMcpCore, serve_stdio};
