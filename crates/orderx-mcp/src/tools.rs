//! MCP tool definitions and results
//!
//! # Tools
//!
//! - `inventory_check` - check whether on-hand stock covers the required
//!   quantity of each item in a business unit

use orderx_inventory::ResponseEnvelope;
use serde::{Deserialize, Serialize};

/// Name of the inventory tool
pub const INVENTORY_CHECK: &str = "inventory_check";

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    /// Render a lookup envelope; failures keep their `Error:` text and are
    /// flagged as errors
    pub fn from_envelope(envelope: &ResponseEnvelope) -> Self {
        let text = envelope.to_tool_output();
        if envelope.is_success() {
            Self::text(text)
        } else {
            Self::error(text)
        }
    }
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: INVENTORY_CHECK.to_string(),
        description: "Check whether on-hand inventory covers the required quantity of each item \
                      in a business unit. Returns one verdict per item, in request order, with \
                      the available and required quantities."
            .to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "item_numbers": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Item numbers to check"
                },
                "required_quantities": {
                    "type": "array",
                    "items": { "type": "integer", "minimum": 0 },
                    "description": "Quantity needed per item, paired by position with item_numbers"
                },
                "business_unit": {
                    "type": "string",
                    "description": "Business unit whose stock is checked"
                },
                "timeout_secs": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Override the lookup timeout for this call"
                }
            },
            "required": ["item_numbers", "required_quantities", "business_unit"]
        }),
    }]
}
