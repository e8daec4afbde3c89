//! MCP Tool Handlers
//!
//! Lookups block on a worker process for up to the configured timeout, so
//! they run on tokio's blocking pool rather than on the protocol loop.

use std::sync::Arc;
use std::time::Duration;

use orderx_inventory::InventoryCheck;
use serde_json::Value;

use crate::tools::{INVENTORY_CHECK, ToolResult};
use crate::{Error, Result};

/// Handle a tool call by dispatching to the appropriate handler
pub async fn handle_tool_call(
    check: Arc<InventoryCheck>,
    tool_name: &str,
    arguments: Value,
) -> Result<ToolResult> {
    match tool_name {
        INVENTORY_CHECK => handle_inventory_check(check, arguments).await,
        _ => Err(Error::UnknownTool(tool_name.to_string())),
    }
}

/// Handle inventory_check
///
/// Argument shapes are validated by the inventory library on the raw JSON,
/// so a malformed call is answered with a validation error before any
/// worker is spawned.
async fn handle_inventory_check(
    check: Arc<InventoryCheck>,
    arguments: Value,
) -> Result<ToolResult> {
    let Value::Object(mut args) = arguments else {
        return Err(Error::InvalidArguments {
            message: "arguments must be an object".to_string(),
        });
    };
    let timeout = parse_timeout(args.get("timeout_secs"))?;

    let item_numbers = args.remove("item_numbers").unwrap_or(Value::Null);
    let required_quantities = args.remove("required_quantities").unwrap_or(Value::Null);
    let business_unit = args.remove("business_unit").unwrap_or(Value::Null);

    let envelope = tokio::task::spawn_blocking(move || {
        check.check_value(&item_numbers, &required_quantities, &business_unit, timeout)
    })
    .await?;

    Ok(ToolResult::from_envelope(&envelope))
}

fn parse_timeout(value: Option<&Value>) -> Result<Option<Duration>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match value.as_u64() {
            Some(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
            _ => Err(Error::InvalidArguments {
                message: format!("timeout_secs must be a positive integer, got {}", value),
            }),
        },
    }
}
