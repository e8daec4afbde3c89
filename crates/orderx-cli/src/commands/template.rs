//! `orderx template render`

use colored::Colorize;
use orderx_inventory::{InventoryConfig, SqlTemplate};

use crate::error::{CliError, Result};

/// Load the configured template and print it expanded for `count` keys
pub fn run_template_render(config: &InventoryConfig, count: u64) -> Result<()> {
    let count = usize::try_from(count)
        .map_err(|_| CliError::user(format!("--count {} is too large", count)))?;
    let template = SqlTemplate::load(&config.query.template)?;

    if let Some(source) = template.source() {
        eprintln!("{} {}", "--".dimmed(), source.display().to_string().dimmed());
    }
    println!("{}", template.materialize(count).trim_end());
    Ok(())
}
