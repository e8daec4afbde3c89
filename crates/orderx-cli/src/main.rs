//! OrderX CLI
//!
//! Runs inventory checks from the command line and helps troubleshoot the
//! configuration and SQL template behind them.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use orderx_inventory::InventoryConfig;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands, ConfigAction, TemplateAction};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        // stdout is reserved for command output
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("failed to set tracing subscriber: {}", e)))?;
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        println!("{} OrderX inventory check", "orderx".green().bold());
        println!();
        println!("Run {} for available commands.", "orderx --help".cyan());
        return Ok(());
    };

    let config = InventoryConfig::from_env(&cli.config)?;
    tracing::debug!(
        config = ?cli.config,
        driver = %config.connection.driver,
        "Configuration resolved"
    );

    match command {
        Commands::Check {
            items,
            quantities,
            business_unit,
            timeout,
            json,
        } => commands::run_check(&config, items, quantities, &business_unit, timeout, json),
        Commands::Config {
            action: ConfigAction::Show { json },
        } => commands::run_config_show(&config, json),
        Commands::Template {
            action: TemplateAction::Render { count },
        } => commands::run_template_render(&config, count),
    }
}
