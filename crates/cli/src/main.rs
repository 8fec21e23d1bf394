//! Stockroom CLI.
//!
//! Without a subcommand it runs the interactive menu. Subcommands:
//! - `stockroom list` - print the inventory table
//! - `stockroom search <term>` - search name, category, supplier and barcode
//! - `stockroom low-stock` - items at or below their minimum stock
//! - `stockroom category <name>` - items of one category
//! - `stockroom report [--json]` - analytics
//! - `stockroom export <path>` / `stockroom import <path> [--replace]`

mod commands;
mod menu;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use commands::Command;
use stockroom_inventory::{InventoryStore, StoreConfig};
use stockroom_observability::{LogFormat, LogSettings};

/// Single-user inventory tracker backed by a CSV file
#[derive(Debug, Parser)]
#[command(name = "stockroom")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Inventory file (overrides STOCKROOM_DATA_FILE)
    #[arg(long, global = true, value_name = "PATH")]
    data_file: Option<PathBuf>,

    /// Log format: text or json (overrides STOCKROOM_LOG_FORMAT)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log = LogSettings::from_env();
    if let Some(format) = cli.log_format {
        log = log.with_format(format);
    }
    stockroom_observability::init(&log);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = StoreConfig::from_env();
    if let Some(path) = cli.data_file {
        config = config.with_data_file(path);
    }

    let mut store = InventoryStore::open(&config).with_context(|| {
        format!("could not open inventory file {}", config.data_file.display())
    })?;

    match cli.command {
        None => menu::run(&mut store),
        Some(command) => commands::run(command, &mut store),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["stockroom"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.data_file.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "list",
            "--data-file",
            "/tmp/stock.csv",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::List)));
        assert_eq!(cli.data_file, Some(PathBuf::from("/tmp/stock.csv")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["stockroom", "search", "drill"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Search { ref term }) if term == "drill"));

        let cli = Cli::try_parse_from(["stockroom", "low-stock"]).unwrap();
        assert!(matches!(cli.command, Some(Command::LowStock)));

        let cli = Cli::try_parse_from(["stockroom", "report", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Report { json: true })));

        let cli = Cli::try_parse_from(["stockroom", "import", "old.csv", "--replace"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Import { ref path, replace: true }) if path == &PathBuf::from("old.csv")
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["stockroom", "search"]).is_err());
        assert!(Cli::try_parse_from(["stockroom", "--log-format", "yaml"]).is_err());
        assert!(Cli::try_parse_from(["stockroom", "explode"]).is_err());
    }
}
