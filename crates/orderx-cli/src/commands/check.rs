//! `orderx check`

use std::time::Duration;

use colored::Colorize;
use orderx_inventory::{InventoryCheck, InventoryConfig, LookupResult};

use crate::error::Result;

/// Run one batch check and print the verdicts
///
/// A lookup that fails (validation, template, connection, worker or
/// timeout) is returned as an error so the process exits non-zero.
/// Unsatisfied items are not an error.
pub fn run_check(
    config: &InventoryConfig,
    items: Vec<String>,
    quantities: Vec<i64>,
    business_unit: &str,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut check = InventoryCheck::from_config(config);
    if let Some(secs) = timeout {
        check = check.with_timeout(Duration::from_secs(secs));
    }

    let results = check.check(items, quantities, business_unit).into_result()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_table(business_unit, &results);
    Ok(())
}

fn print_table(business_unit: &str, results: &[LookupResult]) {
    println!("{} {}", "Inventory check:".bold(), business_unit);
    println!();

    let width = results
        .iter()
        .map(|r| r.key.len())
        .max()
        .unwrap_or(0)
        .max("ITEM".len());
    println!(
        "  {:<width$}  {:>10}  {:>10}  {}",
        "ITEM".dimmed(),
        "AVAILABLE".dimmed(),
        "REQUIRED".dimmed(),
        "OK".dimmed(),
        width = width
    );
    for result in results {
        let verdict = if result.satisfied {
            "yes".green()
        } else {
            "no".red()
        };
        println!(
            "  {:<width$}  {:>10}  {:>10}  {}",
            result.key,
            result.available_amount,
            result.required_amount,
            verdict,
            width = width
        );
    }

    let short = results.iter().filter(|r| !r.satisfied).count();
    println!();
    if short == 0 {
        println!("{} all {} item(s) available", "OK".green().bold(), results.len());
    } else {
        println!(
            "{} {} of {} item(s) short",
            "SHORT".yellow().bold(),
            short,
            results.len()
        );
    }
}
