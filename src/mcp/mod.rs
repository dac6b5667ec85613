//! MCP (Model Context Protocol) server implementation
//!
//! Exposes the three vector store tools over stdio.

mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use tools::{get_tool_definitions, handle_tool_call};
pub use types::{RpcError, RpcRequest, RpcResponse, ToolResult};
