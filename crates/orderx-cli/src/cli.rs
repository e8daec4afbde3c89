//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OrderX inventory check - ask whether stock covers an order
#[derive(Parser, Debug)]
#[command(name = "orderx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "ORDERX_CONFIG", default_value = "orderx.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check availability for a batch of items
    ///
    /// Pass --item and --quantity once per item, in the same order.
    ///
    /// Examples:
    ///   orderx check -i AS6647431 -q 2000 -b "US1 Business Unit"
    ///   orderx check -i A -q 5 -i B -q 10 -b "US1 Business Unit" --json
    Check {
        /// Item number to check (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,

        /// Required quantity for the item at the same position (repeatable)
        #[arg(short, long = "quantity", allow_negative_numbers = true)]
        quantities: Vec<i64>,

        /// Business unit whose stock is checked
        #[arg(short, long)]
        business_unit: String,

        /// Override the configured timeout, in seconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,

        /// Print the raw JSON verdicts
        #[arg(long)]
        json: bool,
    },

    /// Inspect the resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Work with the SQL template
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the configuration in effect, with connection properties redacted
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TemplateAction {
    /// Print the statement the template produces for a batch size
    Render {
        /// Number of keys in the batch
        #[arg(
            short = 'n',
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        count: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check_with_repeated_items() {
        let cli = Cli::parse_from([
            "orderx", "check", "-i", "A", "-q", "5", "-i", "B", "-q", "-1", "-b", "US1",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Check {
                items: vec!["A".into(), "B".into()],
                quantities: vec![5, -1],
                business_unit: "US1".into(),
                timeout: None,
                json: false,
            })
        );
    }

    #[test]
    fn parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["orderx", "config", "show", "--config", "/etc/orderx.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/orderx.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show { json: false }
            })
        );
    }

    #[test]
    fn template_render_rejects_zero() {
        assert!(Cli::try_parse_from(["orderx", "template", "render", "--count", "0"]).is_err());
    }
}
