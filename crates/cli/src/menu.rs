//! Interactive menu.
//!
//! Prompts collect already-validated primitives and hand them to the store;
//! the store re-checks its own invariants and the menu only reports the
//! outcome.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{Confirm, Input, MultiSelect, Select};

use stockroom_core::ItemId;
use stockroom_inventory::item::{self, DEFAULT_MINIMUM_STOCK, MAX_AMOUNT};
use stockroom_inventory::{
    AnalyticsSummary, CategoryListing, ImportMode, InventoryStore, InventoryTable, ItemPatch,
    LowStockAlert, NewItem, SearchResults, UpdateOutcome,
};

use crate::commands::write_import_summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddBasic,
    AddFull,
    Display,
    Update,
    Delete,
    Search,
    Adjust,
    LowStock,
    ByCategory,
    Analytics,
    Export,
    Import,
    Help,
    Exit,
}

impl Action {
    const ALL: [Action; 14] = [
        Action::AddBasic,
        Action::AddFull,
        Action::Display,
        Action::Update,
        Action::Delete,
        Action::Search,
        Action::Adjust,
        Action::LowStock,
        Action::ByCategory,
        Action::Analytics,
        Action::Export,
        Action::Import,
        Action::Help,
        Action::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            Action::AddBasic => "Add new item (basic)",
            Action::AddFull => "Add new item (all fields)",
            Action::Display => "Display all items",
            Action::Update => "Update item",
            Action::Delete => "Delete item",
            Action::Search => "Search items",
            Action::Adjust => "Adjust quantity",
            Action::LowStock => "Low stock alert",
            Action::ByCategory => "View by category",
            Action::Analytics => "Analytics report",
            Action::Export => "Export to CSV",
            Action::Import => "Import from CSV",
            Action::Help => "Help",
            Action::Exit => "Save and exit",
        }
    }
}

const UPDATE_KINDS: [&str; 4] = ["Name only", "Quantity only", "Cost only", "Multiple fields"];

/// Fields offered by the "multiple fields" update.
const PATCH_FIELDS: [&str; 10] = [
    "Name",
    "Category",
    "Supplier",
    "Location",
    "Description",
    "Quantity",
    "Minimum stock",
    "Cost",
    "Selling price",
    "Expiry date",
];

pub fn run(store: &mut InventoryStore) -> Result<()> {
    println!("Welcome to Stockroom.");
    report_load(store);

    let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
    loop {
        print_header(store);

        let choice = Select::new()
            .with_prompt("Choose an action")
            .items(&labels)
            .default(0)
            .interact()?;
        let action = Action::ALL[choice];
        if action == Action::Exit {
            break;
        }

        println!();
        handle(action, store)?;
    }

    println!("Saving inventory data...");
    match store.save() {
        Ok(()) => println!("Saved to {}", store.path().display()),
        Err(err) => {
            tracing::error!(error = %err, "final save failed");
            println!("Could not save inventory: {err}");
        }
    }
    Ok(())
}

fn report_load(store: &InventoryStore) {
    let summary = store.load_summary();
    println!(
        "Loaded {} item(s) from {}",
        summary.loaded,
        store.path().display()
    );
    if !summary.errors.is_empty() {
        println!("Skipped {} unreadable line(s):", summary.errors.len());
        for err in &summary.errors {
            println!("  {err}");
        }
    }
    if summary.reassigned_ids > 0 {
        println!(
            "{} item(s) had duplicate ids and were given new ones",
            summary.reassigned_ids
        );
    }
}

fn print_header(store: &InventoryStore) {
    let line = "=".repeat(60);
    println!();
    println!("{line}");
    println!("STOCKROOM INVENTORY");
    println!("{line}");
    println!(
        "Current Stats: {} items | Total Value: ${:.2} | Potential Profit: ${:.2}",
        store.len(),
        store.total_value(),
        store.total_profit()
    );
    if store.has_unsaved_changes() {
        println!("WARNING: the last change could not be saved to {}", store.path().display());
    }
    println!("{}", "-".repeat(60));
}

fn handle(action: Action, store: &mut InventoryStore) -> Result<()> {
    match action {
        Action::AddBasic => add_basic(store),
        Action::AddFull => add_full(store),
        Action::Display => {
            print!(
                "{}",
                InventoryTable {
                    items: store.items(),
                    now: item::now(),
                    expiry_window_days: store.expiry_window_days(),
                }
            );
            Ok(())
        }
        Action::Update => update(store),
        Action::Delete => delete(store),
        Action::Search => {
            let term = prompt_required("Search term (name/category/supplier/barcode)")?;
            let matches = store.search(&term);
            print!("{}", SearchResults { term: &term, matches: &matches });
            Ok(())
        }
        Action::Adjust => adjust(store),
        Action::LowStock => {
            let items = store.low_stock();
            print!("{}", LowStockAlert { items: &items });
            Ok(())
        }
        Action::ByCategory => {
            let category = prompt_required("Category name")?;
            let items = store.by_category(&category);
            print!("{}", CategoryListing { category: &category, items: &items });
            Ok(())
        }
        Action::Analytics => {
            let report = store.analytics();
            print!("{}", AnalyticsSummary { report: &report });
            Ok(())
        }
        Action::Export => export(store),
        Action::Import => import(store),
        Action::Help => {
            print!("{HELP}");
            Ok(())
        }
        Action::Exit => Ok(()),
    }
}

fn add_basic(store: &mut InventoryStore) -> Result<()> {
    let name = prompt_required("Item name")?;
    let quantity = prompt_count("Quantity", None)?;
    let cost = prompt_money("Cost per unit ($)")?;

    match store.add(NewItem::basic(name.clone(), quantity, cost)) {
        Ok(id) => println!("Item '{name}' added with id {id}."),
        Err(err) => println!("Failed to add item: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn add_full(store: &mut InventoryStore) -> Result<()> {
    let name = prompt_required("Item name")?;
    let category = prompt_required("Category")?;
    let quantity = prompt_count("Quantity", None)?;
    let cost = prompt_money("Cost per unit ($)")?;
    let selling_price = prompt_money("Selling price ($)")?;
    println!("Optional fields (press Enter to skip):");
    let supplier = prompt_optional("Supplier")?;
    let location = prompt_optional("Location")?;
    let description = prompt_optional("Description")?;
    let minimum_stock = prompt_count("Minimum stock level", Some(DEFAULT_MINIMUM_STOCK))?;
    let expiry = prompt_date("Expiry date (YYYY-MM-DD)")?;

    let mut new = NewItem::new(name.clone(), category, quantity, cost)
        .with_selling_price(selling_price)
        .with_supplier(supplier)
        .with_location(location)
        .with_description(description)
        .with_minimum_stock(minimum_stock);
    new.expiry_date = expiry;

    match store.add(new) {
        Ok(id) => println!("Item '{name}' added with id {id}."),
        Err(err) => println!("Failed to add item: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn update(store: &mut InventoryStore) -> Result<()> {
    let Some(id) = prompt_existing_id(store, "Item id to update")? else {
        return Ok(());
    };

    let kind = Select::new()
        .with_prompt("What would you like to update?")
        .items(&UPDATE_KINDS[..])
        .default(0)
        .interact()?;

    let patch = match kind {
        0 => ItemPatch::new().name(prompt_required("New name")?),
        1 => ItemPatch::new().quantity(prompt_count("New quantity", None)?),
        2 => ItemPatch::new().cost(prompt_money("New cost ($)")?),
        _ => prompt_patch()?,
    };

    match store.update(id, patch) {
        Ok(UpdateOutcome::Updated) => println!("Item {id} updated."),
        Ok(UpdateOutcome::NoChanges) => println!("No changes made."),
        Err(err) => println!("Update failed: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn prompt_patch() -> Result<ItemPatch> {
    let chosen = MultiSelect::new()
        .with_prompt("Fields to update (space to toggle, enter to confirm)")
        .items(&PATCH_FIELDS[..])
        .interact()?;

    let mut patch = ItemPatch::new();
    for index in chosen {
        patch = match PATCH_FIELDS[index] {
            "Name" => patch.name(prompt_required("New name")?),
            "Category" => patch.category(prompt_required("New category")?),
            "Supplier" => patch.supplier(prompt_optional("New supplier")?),
            "Location" => patch.location(prompt_optional("New location")?),
            "Description" => patch.description(prompt_optional("New description")?),
            "Quantity" => patch.quantity(prompt_count("New quantity", None)?),
            "Minimum stock" => patch.minimum_stock(prompt_count("New minimum stock", None)?),
            "Cost" => patch.cost(prompt_money("New cost ($)")?),
            "Selling price" => patch.selling_price(prompt_money("New selling price ($)")?),
            _ => patch.expiry_date(prompt_date("New expiry date (YYYY-MM-DD, blank clears)")?),
        };
    }
    Ok(patch)
}

fn delete(store: &mut InventoryStore) -> Result<()> {
    let Some(id) = prompt_existing_id(store, "Item id to delete")? else {
        return Ok(());
    };

    let confirmed = Confirm::new()
        .with_prompt("Are you sure you want to delete this item?")
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Delete cancelled.");
        return Ok(());
    }

    match store.delete(id) {
        Ok(item) => println!("Item '{}' deleted.", item.name()),
        Err(err) => println!("Delete failed: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn adjust(store: &mut InventoryStore) -> Result<()> {
    let Some(id) = prompt_existing_id(store, "Item id")? else {
        return Ok(());
    };
    let delta: i64 = Input::new()
        .with_prompt("Quantity adjustment (positive adds, negative removes)")
        .interact_text()?;

    match store.adjust_quantity(id, delta) {
        Ok(quantity) => println!("Quantity of item {id} is now {quantity}."),
        Err(err) => println!("Adjustment failed: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn export(store: &mut InventoryStore) -> Result<()> {
    let path = prompt_required("Export filename (e.g. export.csv)")?;
    match store.export_to(&path) {
        Ok(count) => println!("Exported {count} item(s) to {path}."),
        Err(err) => println!("Export failed: {err}"),
    }
    Ok(())
}

fn import(store: &mut InventoryStore) -> Result<()> {
    let path = prompt_required("CSV filename to import")?;
    let replace = Confirm::new()
        .with_prompt("Clear existing inventory before import?")
        .default(false)
        .interact()?;
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    match store.import_from(&path, mode) {
        Ok(summary) => write_import_summary(&mut std::io::stdout(), &summary)?,
        Err(err) => println!("Import failed: {err}"),
    }
    report_unsaved(store);
    Ok(())
}

fn report_unsaved(store: &InventoryStore) {
    if store.has_unsaved_changes() {
        println!(
            "Warning: changes are kept in memory but could not be written to {}.",
            store.path().display()
        );
    }
}

/// Ask for an id; `None` when no item has it.
fn prompt_existing_id(store: &InventoryStore, prompt: &str) -> Result<Option<ItemId>> {
    let raw: u64 = Input::new()
        .with_prompt(prompt)
        .validate_with(|id: &u64| if *id == 0 { Err("ids start at 1") } else { Ok(()) })
        .interact_text()?;
    let id = ItemId::new(raw);
    if store.contains(id) {
        Ok(Some(id))
    } else {
        println!("No item with id {id}.");
        Ok(None)
    }
}

fn prompt_required(prompt: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|s: &String| {
            if s.trim().is_empty() {
                Err("a value is required")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_optional(prompt: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_count(prompt: &str, default: Option<i64>) -> Result<i64> {
    let mut input = Input::<i64>::new()
        .with_prompt(prompt)
        .validate_with(|n: &i64| if *n < 0 { Err("must not be negative") } else { Ok(()) });
    if let Some(default) = default {
        input = input.default(default);
    }
    Ok(input.interact_text()?)
}

fn prompt_money(prompt: &str) -> Result<f64> {
    let value = Input::<f64>::new()
        .with_prompt(prompt)
        .validate_with(|v: &f64| {
            if v.is_finite() && *v >= 0.0 && *v < MAX_AMOUNT {
                Ok(())
            } else {
                Err("must be a non-negative amount below 1000000000000")
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_date(prompt: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|s: &String| -> Result<(), String> {
            if s.trim().is_empty() {
                return Ok(());
            }
            parse_date(s)
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not a YYYY-MM-DD date", s.trim()))
        })
        .interact_text()?;
    Ok(parse_date(&raw))
}

/// Midnight UTC of a `YYYY-MM-DD` date.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

const HELP: &str = "\
HELP
===================================
- Add (basic): name, quantity and cost; category is 'General'
- Add (all fields): category, prices, supplier, location, minimum stock, expiry
- Display: full table with a status column (LOW, EXP SOON, EXPIRED, OK)
- Update: change one or several fields of an item
- Delete: remove an item after confirmation
- Search: substring match on name, category, supplier (any case) and barcode
- Adjust quantity: add or remove stock; quantities never go below zero
- Low stock: items at or below their minimum stock
- View by category: exact category match, any case
- Analytics: totals, category breakdown, expiry counts, top items by value
- Export / Import: CSV files with the same layout as the data file

Every change is written to the data file immediately.
Set STOCKROOM_DATA_FILE or pass --data-file to use another file.
";
