//! Agent-facing server for the decision bridge.
//!
//! - [`mcp`] speaks JSON-RPC 2.0 over stdio
//! - [`tools`] maps named tools onto the runtime handle
//! - [`engine_link`] carries engine events and answers over TCP
//! - [`config`] and [`logging`] set up the process
pub mod config;
pub mod engine_link;
pub mod logging;
pub mod mcp;
pub mod tools;

pub use config::ServerConfig;
pub use mcp::McpServer;
pub use tools::ToolDispatcher;
