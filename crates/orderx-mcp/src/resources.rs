//! MCP Resources
//!
//! Read-only views of the server's state.
//!
//! | URI | Description | Content-Type |
//! |-----|-------------|--------------|
//! | `orderx://config` | Resolved configuration, properties redacted | application/json |

use orderx_inventory::InventoryConfig;
use serde::Serialize;

use crate::{Error, Result};

pub const CONFIG_URI: &str = "orderx://config";

/// Resource definition for MCP protocol
#[derive(Debug, Clone, Serialize)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Content returned by resources/read
#[derive(Debug, Clone)]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Get all available resource definitions
pub fn get_resource_definitions() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: CONFIG_URI.to_string(),
        name: "OrderX configuration".to_string(),
        description: "Driver, endpoint, template and worker settings in effect".to_string(),
        mime_type: "application/json".to_string(),
    }]
}

/// Read a resource by URI
pub fn read_resource(config: &InventoryConfig, uri: &str) -> Result<ResourceContent> {
    match uri {
        CONFIG_URI => Ok(ResourceContent {
            uri: CONFIG_URI.to_string(),
            mime_type: "application/json".to_string(),
            text: serde_json::to_string_pretty(&config.redacted())?,
        }),
        _ => Err(Error::UnknownResource(uri.to_string())),
    }
}
