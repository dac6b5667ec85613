//! MCP stdio server loop

use super::tools::{get_tool_definitions, handle_tool_call};
use super::types::{CallToolParams, ErrorCode, RpcError, RpcMessage, RpcRequest, RpcResponse};
use crate::error::Result;
use crate::store::ContextStore;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

/// MCP server speaking JSON-RPC 2.0 over stdin/stdout
pub struct McpServer {
    store: ContextStore,
}

impl McpServer {
    pub fn new(store: ContextStore) -> Self {
        Self { store }
    }

    /// Run the server loop until stdin closes.
    ///
    /// Logging goes to stderr; stdout carries only protocol frames.
    pub async fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        info!("MCP server starting on stdio");

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }

            let message: RpcMessage = match serde_json::from_str(&line) {
                Ok(message) => message,
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    let response = RpcResponse::error(
                        None,
                        RpcError::new(ErrorCode::ParseError, format!("Parse error: {}", e)),
                    );
                    writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                    stdout.flush()?;
                    continue;
                }
            };

            match message {
                RpcMessage::Request(request) => {
                    let response = self.handle_request(request).await;
                    writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                    stdout.flush()?;
                }
                RpcMessage::Notification(notification) => {
                    match notification.method.as_str() {
                        "notifications/initialized" => info!("Client initialized"),
                        "notifications/cancelled" => info!("Request cancelled"),
                        other => debug!("Ignoring notification: {}", other),
                    }
                }
                RpcMessage::Response(_) => {
                    warn!("Unexpected response message received");
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    async fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => RpcResponse::success(id, json!({ "tools": get_tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => RpcResponse::success(id, json!({ "resources": [] })),
            "prompts/list" => RpcResponse::success(id, json!({ "prompts": [] })),
            other => RpcResponse::error(
                id,
                RpcError::new(
                    ErrorCode::MethodNotFound,
                    format!("Method not found: {}", other),
                ),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> RpcResponse {
        RpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false },
                    "prompts": { "listChanged": false }
                },
                "serverInfo": {
                    "name": "context-db-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let params = match params {
            Some(params) => params,
            None => {
                return RpcResponse::error(
                    id,
                    RpcError::new(ErrorCode::InvalidParams, "Missing params"),
                )
            }
        };

        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return RpcResponse::error(
                    id,
                    RpcError::new(ErrorCode::InvalidParams, format!("Invalid params: {}", e)),
                )
            }
        };

        debug!("Calling tool: {}", params.name);

        let result = handle_tool_call(&params.name, &params.arguments, &self.store).await;

        RpcResponse::success(
            id,
            json!({
                "content": result.content,
                "isError": result.is_error
            }),
        )
    }
}
