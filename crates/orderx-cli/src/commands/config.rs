//! `orderx config show`

use orderx_inventory::InventoryConfig;

use crate::error::Result;

/// Print the resolved configuration with connection properties redacted
pub fn run_config_show(config: &InventoryConfig, json: bool) -> Result<()> {
    let redacted = config.redacted();
    if json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
    } else {
        print!("{}", redacted.to_toml_string()?);
    }
    Ok(())
}
