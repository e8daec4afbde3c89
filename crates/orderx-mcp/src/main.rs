//! OrderX inventory MCP Server
//!
//! Exposes the batch inventory check to agents over the Model Context
//! Protocol.
//!
//! # Usage
//!
//! ```bash
//! orderx-mcp [--config <path>]
//! ```
//!
//! # Environment Variables
//!
//! - `ORDERX_CONFIG`: config file path (default: `orderx.toml`)
//! - `ORDERX_*`: per-setting overrides, see `orderx_inventory::config`
//! - `RUST_LOG`: Control log verbosity (default: `orderx_mcp=info`)
//!
//! # Protocol
//!
//! JSON-RPC 2.0 over stdio. Responses go to stdout; logs, including those
//! of the worker processes, go to stderr.

use std::path::PathBuf;

use clap::Parser;
use orderx_inventory::InventoryConfig;
use orderx_mcp::OrderxMcpServer;

/// MCP server for the OrderX inventory check
#[derive(Parser)]
#[command(name = "orderx-mcp")]
#[command(about = "MCP server for the OrderX inventory check")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "ORDERX_CONFIG", default_value = "orderx.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orderx_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!(config = ?args.config, "Starting orderx-mcp server");

    let config = InventoryConfig::from_env(&args.config)?;
    let mut server = OrderxMcpServer::new(config);
    server.run().await?;

    Ok(())
}
