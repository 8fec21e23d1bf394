//! Non-interactive subcommands.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use stockroom_inventory::item;
use stockroom_inventory::{
    AnalyticsSummary, CategoryListing, ImportMode, ImportSummary, InventoryStore, InventoryTable,
    LowStockAlert, SearchResults,
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full inventory table
    List,

    /// Search name, category and supplier (any case) and barcode
    Search { term: String },

    /// List items at or below their minimum stock
    LowStock,

    /// List the items of one category
    Category { name: String },

    /// Print inventory analytics
    Report {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write every item to another CSV file
    Export { path: PathBuf },

    /// Load items from a CSV file into the inventory
    Import {
        path: PathBuf,

        /// Drop the current items first instead of appending
        #[arg(long)]
        replace: bool,
    },
}

pub fn run(command: Command, store: &mut InventoryStore) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(command, store, &mut out)
}

fn execute(command: Command, store: &mut InventoryStore, out: &mut dyn Write) -> Result<()> {
    let now = item::now();

    match command {
        Command::List => write!(
            out,
            "{}",
            InventoryTable {
                items: store.items(),
                now,
                expiry_window_days: store.expiry_window_days(),
            }
        )?,
        Command::Search { term } => {
            let matches = store.search(&term);
            write!(out, "{}", SearchResults { term: &term, matches: &matches })?;
        }
        Command::LowStock => {
            let items = store.low_stock();
            write!(out, "{}", LowStockAlert { items: &items })?;
        }
        Command::Category { name } => {
            let items = store.by_category(&name);
            write!(out, "{}", CategoryListing { category: &name, items: &items })?;
        }
        Command::Report { json } => {
            let report = store.analytics_at(now);
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", AnalyticsSummary { report: &report })?;
            }
        }
        Command::Export { path } => {
            let count = store
                .export_to(&path)
                .with_context(|| format!("export to {} failed", path.display()))?;
            writeln!(out, "Exported {count} item(s) to {}", path.display())?;
        }
        Command::Import { path, replace } => {
            let mode = if replace {
                ImportMode::Replace
            } else {
                ImportMode::Merge
            };
            let summary = store
                .import_from(&path, mode)
                .with_context(|| format!("import from {} failed", path.display()))?;
            write_import_summary(out, &summary)?;

            if store.has_unsaved_changes() {
                bail!(
                    "imported items could not be written to {}",
                    store.path().display()
                );
            }
        }
    }

    Ok(())
}

pub fn write_import_summary(out: &mut dyn Write, summary: &ImportSummary) -> io::Result<()> {
    writeln!(out, "Imported {} item(s)", summary.imported)?;
    if !summary.errors.is_empty() {
        writeln!(out, "Skipped {} unreadable record(s):", summary.errors.len())?;
        for err in &summary.errors {
            writeln!(out, "  {err}")?;
        }
    }
    if summary.reassigned_ids > 0 {
        writeln!(
            out,
            "{} item(s) received a new id because theirs was taken",
            summary.reassigned_ids
        )?;
    }
    Ok(())
}
