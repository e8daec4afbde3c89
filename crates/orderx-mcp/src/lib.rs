//! MCP server for the OrderX inventory check
//!
//! Exposes the batch availability check to agents over the Model Context
//! Protocol, so that an order-processing agent can ask whether stock covers
//! an order before it commits to it.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (agent) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ orderx-mcp ]
//!        | InventoryCheck::check_value (blocking pool)
//!        v
//! [ orderx-inventory Supervisor ] --> [ worker process ] --> [ data source ]
//! ```
//!
//! # Tools
//!
//! - `inventory_check` - availability verdicts for a batch of items
//!
//! # Resources
//!
//! - `orderx://config` - the resolved configuration, property values redacted

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::OrderxMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
