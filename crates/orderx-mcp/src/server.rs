//! MCP Server implementation
//!
//! Reads line-delimited JSON-RPC requests from stdin and answers on stdout.

use std::io::{BufRead, Write};
use std::sync::Arc;

use orderx_inventory::{InventoryCheck, InventoryConfig};
use serde_json::{Value, json};

use crate::handlers::handle_tool_call;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, ReadResourceParams, ResourcesCapability,
    ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::resources::{ResourceDefinition, get_resource_definitions, read_resource};
use crate::tools::{ToolDefinition, ToolResult, get_tool_definitions};
use crate::{Error, Result};

/// MCP Server for the inventory check
///
/// # Example
///
/// ```ignore
/// use orderx_inventory::InventoryConfig;
/// use orderx_mcp::OrderxMcpServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = InventoryConfig::from_env("orderx.toml".as_ref())?;
///     let mut server = OrderxMcpServer::new(config);
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct OrderxMcpServer {
    config: InventoryConfig,
    check: Arc<InventoryCheck>,
    initialized: bool,
    tools: Vec<ToolDefinition>,
    resources: Vec<ResourceDefinition>,
}

impl OrderxMcpServer {
    /// Create a server running lookups as described by `config`
    pub fn new(config: InventoryConfig) -> Self {
        let check = InventoryCheck::from_config(&config);
        Self::with_check(config, check)
    }

    /// Create a server with an explicitly built [`InventoryCheck`]
    pub fn with_check(config: InventoryConfig, check: InventoryCheck) -> Self {
        Self {
            config,
            check: Arc::new(check),
            initialized: false,
            tools: get_tool_definitions(),
            resources: get_resource_definitions(),
        }
    }

    /// Log the effective settings and mark the server ready
    pub async fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            driver = %self.config.connection.driver,
            template = %self.config.query.template.display(),
            timeout_secs = self.config.worker.timeout_secs,
            "Initializing MCP server"
        );

        self.initialized = true;
        Ok(())
    }

    /// Run the MCP server
    ///
    /// Processes messages until stdin is closed.
    pub async fn run(&mut self) -> Result<()> {
        self.initialize().await?;

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        tracing::info!("MCP server ready, listening on stdio");

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let response = match self.handle_message(&line).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to handle message");
                    serde_json::to_string(&JsonRpcResponse::error(
                        None,
                        INTERNAL_ERROR,
                        format!("Internal error: {}", e),
                    ))?
                }
            };
            // Notifications produce no response
            if !response.is_empty() {
                writeln!(stdout, "{}", response)?;
                stdout.flush()?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single MCP message
    ///
    /// Returns the JSON-RPC response, or an empty string for notifications.
    /// A line that is not a JSON-RPC request gets a parse error response.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable message");
                let response =
                    JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "initialized" | "notifications/initialized" => return Ok(String::new()),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            "resources/list" => self.handle_resources_list(request.id),
            "resources/read" => self.handle_resources_read(request.id, request.params)?,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: "orderx-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Failures inside the tool, including unknown tools and bad arguments,
    /// are reported as error tool results rather than JSON-RPC errors
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let tool_params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        let tool_result = match handle_tool_call(
            Arc::clone(&self.check),
            &tool_params.name,
            tool_params.arguments,
        )
        .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(tool = %tool_params.name, error = %e, "Tool call failed");
                ToolResult::error(format!("Error: {}", e))
            }
        };
        Ok(JsonRpcResponse::success(id, serde_json::to_value(tool_result)?))
    }

    fn handle_resources_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let resources: Vec<Value> = self
            .resources
            .iter()
            .map(|r| {
                json!({
                    "uri": r.uri,
                    "name": r.name,
                    "description": r.description,
                    "mimeType": r.mime_type
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "resources": resources }))
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let read_params: ReadResourceParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        match read_resource(&self.config, &read_params.uri) {
            Ok(content) => Ok(JsonRpcResponse::success(
                id,
                json!({
                    "contents": [{
                        "uri": content.uri,
                        "mimeType": content.mime_type,
                        "text": content.text
                    }]
                }),
            )),
            Err(e) => Ok(JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Resource error: {}", e),
            )),
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn resources(&self) -> &[ResourceDefinition] {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InventoryConfig {
        InventoryConfig::from_toml_str("[connection]\nurl = \"jdbc:sqlite:/tmp/inventory.db\"\n")
            .unwrap()
    }

    #[test]
    fn server_creation() {
        let server = OrderxMcpServer::new(config());
        assert!(!server.is_initialized());
        assert_eq!(server.tools().len(), 1);
        assert_eq!(server.resources().len(), 1);
        assert_eq!(server.config().connection.driver, "sqlite");
    }

    #[tokio::test]
    async fn initialize_marks_ready() {
        let mut server = OrderxMcpServer::new(config());
        server.initialize().await.unwrap();
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let server = OrderxMcpServer::new(config());
        for method in ["initialized", "notifications/initialized"] {
            let message = format!(r#"{{"jsonrpc":"2.0","method":"{}"}}"#, method);
            assert!(server.handle_message(&message).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_message_is_a_parse_error() {
        let server = OrderxMcpServer::new(config());
        let response = server.handle_message("{not json").await.unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], PARSE_ERROR);
    }
}
