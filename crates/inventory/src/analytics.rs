//! Aggregate figures over the item collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::ItemId;

use crate::item::Item;

/// How many items the "highest value" list holds.
pub const TOP_ITEMS: usize = 5;

/// Count and value of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub items: usize,
    pub total_value: f64,
}

/// Entry of the highest-value list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub id: ItemId,
    pub name: String,
    pub total_value: f64,
}

/// Snapshot of the whole inventory.
///
/// Categories are in lexical order of their name. `top_by_value` is sorted by
/// value, highest first; ties keep store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub item_count: usize,
    pub total_value: f64,
    pub total_profit: f64,
    pub potential_revenue: f64,
    /// Profit over cost across all items, in percent (0 when nothing has value).
    pub profit_margin: f64,
    pub categories: Vec<CategorySummary>,
    pub low_stock: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub top_by_value: Vec<RankedItem>,
}

impl InventoryReport {
    pub fn compute(items: &[Item], now: DateTime<Utc>, expiry_window_days: i64) -> Self {
        let mut categories: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for item in items {
            let entry = categories.entry(item.category()).or_default();
            entry.0 += 1;
            entry.1 += item.total_value();
        }

        let mut ranked: Vec<&Item> = items.iter().collect();
        // `sort_by` is stable, so equal values stay in store order.
        ranked.sort_by(|a, b| b.total_value().total_cmp(&a.total_value()));

        let total_value: f64 = items.iter().map(Item::total_value).sum();
        let total_profit: f64 = items.iter().map(Item::profit).sum();
        let profit_margin = if total_value > 0.0 {
            total_profit / total_value * 100.0
        } else {
            0.0
        };

        Self {
            generated_at: now,
            item_count: items.len(),
            total_value,
            total_profit,
            potential_revenue: items.iter().map(Item::potential_revenue).sum(),
            profit_margin,
            categories: categories
                .into_iter()
                .map(|(category, (count, value))| CategorySummary {
                    category: category.to_string(),
                    items: count,
                    total_value: value,
                })
                .collect(),
            low_stock: items.iter().filter(|i| i.is_low_stock()).count(),
            expiring_soon: items
                .iter()
                .filter(|i| i.is_expiring_within(now, expiry_window_days))
                .count(),
            expired: items.iter().filter(|i| i.is_expired_at(now)).count(),
            top_by_value: ranked
                .into_iter()
                .take(TOP_ITEMS)
                .map(|item| RankedItem {
                    id: item.id(),
                    name: item.name().to_string(),
                    total_value: item.total_value(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}
