//! Read-only text views over store contents.
//!
//! Each view borrows what it renders and implements `Display`; none of them
//! hold state of their own.

use core::fmt;

use chrono::{DateTime, Utc};

use crate::analytics::InventoryReport;
use crate::item::Item;

const TABLE_WIDTH: usize = 140;

fn money(value: f64) -> String {
    format!("${value:.2}")
}

/// Shorten `text` so it fits a column of `width`, marking the cut with "...".
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() < width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(4)).collect();
    format!("{kept}...")
}

fn rule(f: &mut fmt::Formatter<'_>, c: char, width: usize) -> fmt::Result {
    writeln!(f, "{}", c.to_string().repeat(width))
}

/// Full inventory table with a status column and a summary line.
pub struct InventoryTable<'a> {
    pub items: &'a [Item],
    pub now: DateTime<Utc>,
    pub expiry_window_days: i64,
}

impl fmt::Display for InventoryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No items found in the inventory.");
        }

        writeln!(f, "INVENTORY REPORT")?;
        rule(f, '=', TABLE_WIDTH)?;
        writeln!(
            f,
            "{:<4}{:<20}{:<12}{:<8}{:<8}{:<10}{:<10}{:<12}{:<12}{:<15}{:<12}{}",
            "ID", "NAME", "CATEGORY", "QTY", "MIN", "COST", "SELL", "VALUE", "PROFIT", "SUPPLIER",
            "LOCATION", "STATUS"
        )?;
        rule(f, '-', TABLE_WIDTH)?;

        let mut total_value = 0.0;
        let mut total_profit = 0.0;
        let mut low_stock = 0;

        for item in self.items {
            let status = item.status_at(self.now, self.expiry_window_days);
            if item.is_low_stock() {
                low_stock += 1;
            }
            total_value += item.total_value();
            total_profit += item.profit();

            writeln!(
                f,
                "{:<4}{:<20}{:<12}{:<8}{:<8}{:<10}{:<10}{:<12}{:<12}{:<15}{:<12}{}",
                item.id(),
                fit(item.name(), 20),
                fit(item.category(), 12),
                item.quantity(),
                item.minimum_stock(),
                money(item.cost()),
                money(item.selling_price()),
                money(item.total_value()),
                money(item.profit()),
                fit(item.supplier(), 15),
                fit(item.location(), 12),
                status
            )?;
        }

        rule(f, '-', TABLE_WIDTH)?;
        writeln!(
            f,
            "SUMMARY: {} items | Value: {} | Potential Profit: {} | Low Stock Items: {}",
            self.items.len(),
            money(total_value),
            money(total_profit),
            low_stock
        )
    }
}

/// Matches of a search term.
pub struct SearchResults<'a> {
    pub term: &'a str,
    pub matches: &'a [&'a Item],
}

impl fmt::Display for SearchResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            return writeln!(f, "No items found matching '{}'", self.term);
        }

        writeln!(f, "SEARCH RESULTS for '{}'", self.term)?;
        rule(f, '=', 100)?;
        for item in self.matches {
            writeln!(
                f,
                "ID: {} | Name: {} | Category: {} | Supplier: {} | Barcode: {}",
                item.id(),
                item.name(),
                item.category(),
                item.supplier(),
                item.barcode()
            )?;
            writeln!(
                f,
                "    Qty: {} | Cost: {} | Sell: {} | Value: {} | Location: {}",
                item.quantity(),
                money(item.cost()),
                money(item.selling_price()),
                money(item.total_value()),
                item.location()
            )?;
        }
        writeln!(f, "Found {} matching item(s)", self.matches.len())
    }
}

/// Items that need restocking.
pub struct LowStockAlert<'a> {
    pub items: &'a [&'a Item],
}

impl fmt::Display for LowStockAlert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No items with low stock detected.");
        }

        writeln!(f, "LOW STOCK ALERT")?;
        rule(f, '=', 80)?;
        for item in self.items {
            writeln!(
                f,
                "CRITICAL - ID: {} | Name: {} | Category: {}",
                item.id(),
                item.name(),
                item.category()
            )?;
            writeln!(
                f,
                "    Current: {} | Minimum: {} | Supplier: {} | Location: {}",
                item.quantity(),
                item.minimum_stock(),
                item.supplier(),
                item.location()
            )?;
        }
        writeln!(f, "{} item(s) need immediate restocking", self.items.len())
    }
}

/// Items of one category.
pub struct CategoryListing<'a> {
    pub category: &'a str,
    pub items: &'a [&'a Item],
}

impl fmt::Display for CategoryListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(f, "No items found in category '{}'", self.category);
        }

        writeln!(f, "ITEMS IN CATEGORY: {}", self.category)?;
        rule(f, '=', 60)?;
        for item in self.items {
            writeln!(
                f,
                "ID: {} | Name: {} | Qty: {} | Cost: {} | Value: {}",
                item.id(),
                item.name(),
                item.quantity(),
                money(item.cost()),
                money(item.total_value())
            )?;
        }
        writeln!(f, "Found {} item(s) in this category", self.items.len())
    }
}

/// Text rendering of an [`InventoryReport`].
pub struct AnalyticsSummary<'a> {
    pub report: &'a InventoryReport,
}

impl fmt::Display for AnalyticsSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        if r.is_empty() {
            return writeln!(f, "No data available for analytics.");
        }

        writeln!(f, "INVENTORY ANALYTICS REPORT")?;
        rule(f, '=', 50)?;
        writeln!(f, "Total Items: {}", r.item_count)?;
        writeln!(f, "Total Inventory Value: {}", money(r.total_value))?;
        writeln!(f, "Total Potential Profit: {}", money(r.total_profit))?;
        writeln!(f, "Potential Revenue: {}", money(r.potential_revenue))?;
        writeln!(f, "Profit Margin: {:.1}%", r.profit_margin)?;

        writeln!(f)?;
        writeln!(f, "CATEGORY BREAKDOWN:")?;
        for c in &r.categories {
            writeln!(
                f,
                "  {}: {} items, {} value",
                c.category,
                c.items,
                money(c.total_value)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "STOCK STATUS:")?;
        writeln!(f, "  Low Stock Items: {}", r.low_stock)?;
        writeln!(f, "  Expiring Soon: {}", r.expiring_soon)?;
        writeln!(f, "  Expired Items: {}", r.expired)?;

        writeln!(f)?;
        writeln!(f, "TOP {} HIGHEST VALUE ITEMS:", r.top_by_value.len())?;
        for (rank, item) in r.top_by_value.iter().enumerate() {
            writeln!(f, "  {}. {} - {}", rank + 1, item.name, money(item.total_value))?;
        }
        Ok(())
    }
}
