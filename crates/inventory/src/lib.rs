//! Inventory tracking over a single CSV file.
//!
//! `item` holds the record and its business rules, `codec` the on-disk row
//! format, and `store` the in-memory collection that owns the backing file.
//! `analytics` and `report` are read-only views over the store.

pub mod analytics;
pub mod codec;
pub mod config;
pub mod item;
pub mod report;
pub mod store;

pub use analytics::{CategorySummary, InventoryReport, RankedItem};
pub use codec::{CodecError, LineError};
pub use config::StoreConfig;
pub use item::{Item, ItemPatch, ItemSnapshot, NewItem, StockStatus};
pub use report::{AnalyticsSummary, CategoryListing, InventoryTable, LowStockAlert, SearchResults};
pub use store::{
    ImportMode, ImportSummary, InventoryStore, LoadSummary, StoreError, UpdateOutcome,
};
