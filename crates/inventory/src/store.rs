//! Inventory store: the owned item collection plus its backing file.
//!
//! Every successful mutation rewrites the whole file (write-through). A failed
//! write is logged and remembered, but the in-memory state stays
//! authoritative for the rest of the session.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use stockroom_core::entity::position_of;
use stockroom_core::{DomainError, DomainResult, IdAllocator, ItemId};

use crate::analytics::InventoryReport;
use crate::codec::{self, LineError, ReadOutcome};
use crate::config::StoreConfig;
use crate::item::{self, Item, ItemPatch, NewItem};

/// File-level failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("csv error in {path:?}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Outcome of [`InventoryStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    /// The patch named no field; nothing was changed or written.
    NoChanges,
}

/// How an import treats the items already in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Append imported items after the existing ones.
    #[default]
    Merge,
    /// Drop existing items first.
    Replace,
}

/// What happened while loading the backing file at startup.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub errors: Vec<LineError>,
    pub reassigned_ids: usize,
}

/// What happened during an import.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<LineError>,
    pub reassigned_ids: usize,
}

/// Single-user item store backed by one CSV file.
#[derive(Debug)]
pub struct InventoryStore {
    items: Vec<Item>,
    ids: IdAllocator,
    path: PathBuf,
    expiry_window_days: i64,
    unsaved_changes: bool,
    load_summary: LoadSummary,
}

impl InventoryStore {
    /// Open the store described by `config`, loading its backing file.
    ///
    /// A missing file yields an empty store. Undecodable lines are logged and
    /// skipped. Only an unreadable (but existing) file is an error.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut store = Self {
            items: Vec::new(),
            ids: IdAllocator::new(),
            path: config.data_file.clone(),
            expiry_window_days: config.expiry_window_days,
            unsaved_changes: false,
            load_summary: LoadSummary::default(),
        };
        store.load()?;
        Ok(store)
    }

    /// Open a store on `path` with default settings.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open(&StoreConfig::default().with_data_file(path))
    }

    fn load(&mut self) -> Result<(), StoreError> {
        let outcome = match read_file(&self.path) {
            Ok(outcome) => outcome,
            Err(StoreError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "no inventory file yet; starting empty"
                );
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        for err in &outcome.errors {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "skipping unreadable inventory record"
            );
        }

        let (loaded, reassigned) = self.merge(outcome.items);
        tracing::info!(
            path = %self.path.display(),
            loaded,
            skipped = outcome.errors.len(),
            "inventory loaded"
        );

        self.load_summary = LoadSummary {
            loaded,
            errors: outcome.errors,
            reassigned_ids: reassigned,
        };
        if reassigned > 0 {
            // Write the new ids back so the file stops carrying duplicates.
            self.persist();
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn expiry_window_days(&self) -> i64 {
        self.expiry_window_days
    }

    /// Result of the startup load.
    pub fn load_summary(&self) -> &LoadSummary {
        &self.load_summary
    }

    /// True when the last write of the backing file failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// All items, in store order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Id the next added item will receive.
    pub fn next_id(&self) -> ItemId {
        self.ids.peek()
    }

    /// Create an item, append it and persist. Returns the new id.
    pub fn add(&mut self, new: NewItem) -> DomainResult<ItemId> {
        let id = self.ids.peek();
        let item = Item::create(id, generate_barcode(), new, item::now())?;
        // Only consume the id once construction succeeded.
        self.ids.allocate();

        tracing::debug!(item_id = %id, name = item.name(), "item added");
        self.items.push(item);
        self.persist();
        Ok(id)
    }

    /// Apply a partial update to the item with `id`.
    pub fn update(&mut self, id: ItemId, patch: ItemPatch) -> DomainResult<UpdateOutcome> {
        let now = item::now();
        if !self.find_mut(id)?.apply(patch, now)? {
            return Ok(UpdateOutcome::NoChanges);
        }

        tracing::debug!(item_id = %id, "item updated");
        self.persist();
        Ok(UpdateOutcome::Updated)
    }

    /// Remove the item with `id` and return it.
    pub fn delete(&mut self, id: ItemId) -> DomainResult<Item> {
        let index = position_of(&self.items, id).ok_or(DomainError::not_found(id))?;
        let removed = self.items.remove(index);

        tracing::debug!(item_id = %id, name = removed.name(), "item deleted");
        self.persist();
        Ok(removed)
    }

    /// Add `delta` to an item's quantity; returns the new quantity.
    pub fn adjust_quantity(&mut self, id: ItemId, delta: i64) -> DomainResult<i64> {
        let quantity = self.find_mut(id)?.update_quantity(delta, item::now())?;

        tracing::debug!(item_id = %id, delta, quantity, "quantity adjusted");
        self.persist();
        Ok(quantity)
    }

    pub fn find(&self, id: ItemId) -> Option<&Item> {
        position_of(&self.items, id).map(|i| &self.items[i])
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.find(id).is_some()
    }

    /// Case-insensitive substring match on name, category and supplier, plus a
    /// case-sensitive substring match on the barcode.
    pub fn search(&self, term: &str) -> Vec<&Item> {
        let needle = term.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.name().to_lowercase().contains(&needle)
                    || item.category().to_lowercase().contains(&needle)
                    || item.supplier().to_lowercase().contains(&needle)
                    || item.barcode().contains(term)
            })
            .collect()
    }

    /// Items whose category equals `category`, ignoring case.
    pub fn by_category(&self, category: &str) -> Vec<&Item> {
        let wanted = category.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.category().to_lowercase() == wanted)
            .collect()
    }

    pub fn low_stock(&self) -> Vec<&Item> {
        self.items.iter().filter(|item| item.is_low_stock()).collect()
    }

    pub fn total_value(&self) -> f64 {
        self.items.iter().map(Item::total_value).sum()
    }

    pub fn total_profit(&self) -> f64 {
        self.items.iter().map(Item::profit).sum()
    }

    pub fn analytics(&self) -> InventoryReport {
        self.analytics_at(item::now())
    }

    pub fn analytics_at(&self, now: DateTime<Utc>) -> InventoryReport {
        InventoryReport::compute(&self.items, now, self.expiry_window_days)
    }

    /// Rewrite the backing file with the current items.
    pub fn save(&mut self) -> Result<(), StoreError> {
        write_file(&self.path, &self.items)?;
        self.unsaved_changes = false;
        Ok(())
    }

    /// Write header plus all items to an arbitrary path. Returns the item count.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<usize, StoreError> {
        let path = path.as_ref();
        write_file(path, &self.items)?;
        tracing::info!(path = %path.display(), items = self.items.len(), "inventory exported");
        Ok(self.items.len())
    }

    /// Read items from `path` into the store, then persist to the backing file.
    ///
    /// Each record is decoded on its own; bad records are counted and skipped.
    /// If `path` cannot be read the store is left untouched.
    pub fn import_from(
        &mut self,
        path: impl AsRef<Path>,
        mode: ImportMode,
    ) -> Result<ImportSummary, StoreError> {
        let path = path.as_ref();
        let outcome = read_file(path)?;

        for err in &outcome.errors {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "skipping unreadable import record"
            );
        }

        if mode == ImportMode::Replace {
            self.items.clear();
        }
        let (imported, reassigned) = self.merge(outcome.items);

        tracing::info!(
            path = %path.display(),
            imported,
            skipped = outcome.errors.len(),
            reassigned,
            "inventory imported"
        );
        self.persist();

        Ok(ImportSummary {
            imported,
            errors: outcome.errors,
            reassigned_ids: reassigned,
        })
    }

    /// Append decoded items, keeping ids unique and the allocator ahead of them.
    ///
    /// Returns (appended, reassigned).
    fn merge(&mut self, incoming: Vec<Item>) -> (usize, usize) {
        for item in &incoming {
            self.ids.observe(item.id());
        }

        let mut taken: HashSet<ItemId> = self.items.iter().map(Item::id).collect();
        let mut reassigned = 0;
        let count = incoming.len();

        for mut item in incoming {
            if !taken.insert(item.id()) {
                let fresh = self.ids.allocate();
                tracing::warn!(
                    old_id = %item.id(),
                    new_id = %fresh,
                    "duplicate item id; assigning a new one"
                );
                item.reassign_id(fresh);
                taken.insert(fresh);
                reassigned += 1;
            }
            self.items.push(item);
        }

        (count, reassigned)
    }

    fn find_mut(&mut self, id: ItemId) -> DomainResult<&mut Item> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(DomainError::not_found(id))
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            self.unsaved_changes = true;
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to persist inventory; keeping in-memory state"
            );
        }
    }
}

/// Random 9-digit barcode.
fn generate_barcode() -> String {
    rand::thread_rng()
        .gen_range(100_000_000u32..=999_999_999)
        .to_string()
}

fn read_file(path: &Path) -> Result<ReadOutcome, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    codec::read_items(BufReader::new(file)).map_err(|source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a sibling temp file, sync it, then rename over `path`.
fn write_file(path: &Path, items: &[Item]) -> Result<(), StoreError> {
    let write_err = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("inventory");
    let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let result = (|| -> Result<(), StoreError> {
        let mut out = BufWriter::new(File::create(&tmp).map_err(write_err)?);
        codec::write_items(&mut out, items).map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let file = out.into_inner().map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn open_in(dir: &tempfile::TempDir) -> InventoryStore {
        InventoryStore::open_at(dir.path().join("inventory_data.csv")).unwrap()
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = open_in(&dir);
        assert!(store.is_empty());
        assert_eq!(store.load_summary().loaded, 0);
        assert_eq!(store.next_id(), ItemId::new(1));
    }

    #[test]
    fn add_widget_scenario() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);

        let id = store
            .add(NewItem::new("Widget", "Tools", 10, 2.50).with_selling_price(5.00))
            .unwrap();
        assert_eq!(id, ItemId::new(1));

        let item = store.find(id).unwrap();
        assert!(!item.is_low_stock());
        assert_eq!(item.total_value(), 25.00);
        assert_eq!(item.profit(), 25.00);
        assert_eq!(item.barcode().len(), 9);
        assert!(item.barcode().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn add_rejects_invalid_items_without_mutating() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("Keep", 1, 1.0)).unwrap();

        for bad in [
            NewItem::basic("Widget", -1, 1.0),
            NewItem::basic("Widget", 1, -1.0),
            NewItem::basic("", 1, 1.0),
        ] {
            assert!(store.add(bad).unwrap_err().is_validation());
        }

        assert_eq!(store.len(), 1);
        // A failed add does not burn an id.
        assert_eq!(store.add(NewItem::basic("Next", 1, 1.0)).unwrap(), ItemId::new(2));
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);

        let a = store.add(NewItem::basic("A", 1, 1.0)).unwrap();
        let b = store.add(NewItem::basic("B", 1, 1.0)).unwrap();
        store.delete(b).unwrap();
        let c = store.add(NewItem::basic("C", 1, 1.0)).unwrap();

        assert!(a < b && b < c);
    }

    #[test]
    fn delete_then_find_returns_nothing() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        let id = store.add(NewItem::basic("Gone", 3, 1.0)).unwrap();
        store.add(NewItem::basic("Stays", 3, 1.0)).unwrap();

        let removed = store.delete(id).unwrap();
        assert_eq!(removed.name(), "Gone");
        assert!(store.find(id).is_none());
        assert_eq!(store.len(), 1);

        assert!(store.delete(id).unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn adjust_quantity_bounds() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        let id = store.add(NewItem::basic("Bolts", 8, 0.1)).unwrap();

        assert!(store.adjust_quantity(id, -9).unwrap_err().is_validation());
        assert_eq!(store.find(id).unwrap().quantity(), 8);

        assert_eq!(store.adjust_quantity(id, 4).unwrap(), 12);
        assert_eq!(store.adjust_quantity(id, -12).unwrap(), 0);
        assert!(store
            .adjust_quantity(ItemId::new(99), 1)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        let id = store
            .add(NewItem::new("Widget", "Tools", 10, 2.5).with_supplier("Acme"))
            .unwrap();

        assert_eq!(
            store.update(id, ItemPatch::new().quantity(3)).unwrap(),
            UpdateOutcome::Updated
        );
        let item = store.find(id).unwrap();
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.supplier(), "Acme");

        assert_eq!(
            store.update(id, ItemPatch::new()).unwrap(),
            UpdateOutcome::NoChanges
        );
        assert!(store
            .update(id, ItemPatch::new().cost(-1.0))
            .unwrap_err()
            .is_validation());
        assert_eq!(store.find(id).unwrap().cost(), 2.5);
        assert!(store
            .update(ItemId::new(42), ItemPatch::new().name("x"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn search_matches_text_fields_and_barcode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory_data.csv");
        let ts = item::now().timestamp();
        std::fs::write(
            &path,
            format!(
                "{}\n\
                 1,Scanner,Barcode-readers,Acme,900000001,3,1,10.00,20.00,{ts},{ts},0,,\n\
                 2,Label,PAPER,Bar123 Supplies,bar123000,3,1,1.00,2.00,{ts},{ts},0,,\n\
                 3,Tape,Office,Tapes Inc,xbar1234x,3,1,1.00,2.00,{ts},{ts},0,,\n\
                 4,Glue,Office,Sticky,BAR123999,3,1,1.00,2.00,{ts},{ts},0,,\n",
                codec::header()
            ),
        )
        .unwrap();
        let store = InventoryStore::open_at(&path).unwrap();

        let ids = |items: Vec<&Item>| items.iter().map(|i| i.id().get()).collect::<Vec<_>>();

        // Case-insensitive on text fields, case-sensitive on barcode.
        assert_eq!(ids(store.search("bar123")), vec![2, 3]);
        assert_eq!(ids(store.search("BAR123")), vec![2, 4]);
        assert_eq!(ids(store.search("bar")), vec![1, 2, 3]);
        assert_eq!(ids(store.search("paper")), vec![2]);
        assert!(store.search("nothing here").is_empty());
    }

    #[test]
    fn by_category_is_case_insensitive_exact() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::new("Saw", "Tools", 9, 1.0)).unwrap();
        store.add(NewItem::new("Drill", "tools", 9, 1.0)).unwrap();
        store.add(NewItem::new("Toolbox", "Tool", 9, 1.0)).unwrap();

        let names: Vec<_> = store.by_category("TOOLS").iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Saw", "Drill"]);
    }

    #[test]
    fn low_stock_lists_items_at_or_below_minimum() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("Plenty", 50, 1.0)).unwrap();
        store.add(NewItem::basic("Edge", 5, 1.0)).unwrap();
        store
            .add(NewItem::basic("Custom", 9, 1.0).with_minimum_stock(10))
            .unwrap();

        let names: Vec<_> = store.low_stock().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["Edge", "Custom"]);
    }

    #[test]
    fn analytics_top_items_scenario() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("A", 10, 10.0)).unwrap();
        store.add(NewItem::basic("B", 10, 5.0)).unwrap();
        store.add(NewItem::basic("C", 10, 20.0)).unwrap();

        let report = store.analytics();
        let order: Vec<_> = report.top_by_value.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(report.total_value, 350.0);
        assert_eq!(store.total_value(), 350.0);
    }

    #[test]
    fn analytics_counts_expiring_items_with_configured_window() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            data_file: dir.path().join("inv.csv"),
            expiry_window_days: 3,
        };
        let mut store = InventoryStore::open(&config).unwrap();
        let now = item::now();
        store
            .add(NewItem::basic("Milk", 10, 1.0).with_expiry_date(now + TimeDelta::days(2)))
            .unwrap();
        store
            .add(NewItem::basic("Rice", 10, 1.0).with_expiry_date(now + TimeDelta::days(20)))
            .unwrap();

        let report = store.analytics_at(now);
        assert_eq!(report.expiring_soon, 1);
        assert_eq!(report.expired, 0);
    }

    #[test]
    fn mutations_are_written_through_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory_data.csv");

        let (first, expected) = {
            let mut store = InventoryStore::open_at(&path).unwrap();
            let first = store
                .add(
                    NewItem::new("Nuts, \"hex\"", "Hardware", 100, 0.05)
                        .with_description("M6\nzinc"),
                )
                .unwrap();
            let second = store.add(NewItem::basic("Washers", 40, 0.02)).unwrap();
            store.adjust_quantity(first, -10).unwrap();
            store.delete(second).unwrap();
            assert!(!store.has_unsaved_changes());
            (first, store.items().to_vec())
        };

        let reopened = InventoryStore::open_at(&path).unwrap();
        assert_eq!(reopened.items(), expected.as_slice());
        assert_eq!(reopened.find(first).unwrap().quantity(), 90);
        // Deleted id 2 is gone from the file, so the counter restarts after 1.
        assert_eq!(reopened.next_id(), ItemId::new(2));
    }

    #[test]
    fn load_skips_bad_lines_and_advances_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory_data.csv");
        std::fs::write(
            &path,
            format!(
                "{}\n\
                 12,Gear,Parts,,123456789,4,5,1.00,2.00,0,0,0,,\n\
                 not,a,record\n\
                 3,Cog,Parts,,123456780,4,5,1.00,2.00,0,0,0,,\n",
                codec::header()
            ),
        )
        .unwrap();

        let mut store = InventoryStore::open_at(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.load_summary().loaded, 2);
        assert_eq!(store.load_summary().errors.len(), 1);

        assert_eq!(store.add(NewItem::basic("New", 1, 1.0)).unwrap(), ItemId::new(13));
    }

    #[test]
    fn load_writes_back_reassigned_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory_data.csv");
        std::fs::write(
            &path,
            format!(
                "{}\n\
                 4,Gear,Parts,,123456789,4,5,1.00,2.00,0,0,0,,\n\
                 4,Cog,Parts,,123456780,4,5,1.00,2.00,0,0,0,,\n",
                codec::header()
            ),
        )
        .unwrap();

        let store = InventoryStore::open_at(&path).unwrap();
        assert_eq!(store.load_summary().reassigned_ids, 1);
        assert!(!store.has_unsaved_changes());
        let ids: Vec<_> = store.items().iter().map(Item::id).collect();
        assert_eq!(ids, vec![ItemId::new(4), ItemId::new(5)]);

        // No mutation happened, yet the file already holds the unique ids.
        let on_disk = read_file(&path).unwrap();
        assert!(on_disk.errors.is_empty());
        let ids: Vec<_> = on_disk.items.iter().map(Item::id).collect();
        assert_eq!(ids, vec![ItemId::new(4), ItemId::new(5)]);
        assert_eq!(on_disk.items[1].name(), "Cog");
    }

    #[test]
    fn import_counts_errors_and_persists() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("Existing", 7, 1.0)).unwrap();
        let before = store.len();

        let import = dir.path().join("import.csv");
        std::fs::write(
            &import,
            format!(
                "{}\n\
                 50,Imported,Misc,,111111111,2,5,3.00,4.00,0,0,0,,\n\
                 51,Broken,Misc,,111111112,2,5,3.00,4.00\n",
                codec::header()
            ),
        )
        .unwrap();

        let summary = store.import_from(&import, ImportMode::Merge).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(store.len(), before + 1);

        let reopened = open_in(&dir);
        assert_eq!(reopened.len(), before + 1);
        assert!(reopened.find(ItemId::new(50)).is_some());
    }

    #[test]
    fn import_replace_clears_but_keeps_id_counter() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        for name in ["a", "b", "c"] {
            store.add(NewItem::basic(name, 7, 1.0)).unwrap();
        }

        let import = dir.path().join("import.csv");
        std::fs::write(
            &import,
            format!(
                "{}\n1,One,Misc,,111111111,2,5,3.00,4.00,0,0,0,,\n",
                codec::header()
            ),
        )
        .unwrap();

        store.import_from(&import, ImportMode::Replace).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].name(), "One");
        assert_eq!(store.add(NewItem::basic("d", 1, 1.0)).unwrap(), ItemId::new(4));
    }

    #[test]
    fn import_reassigns_colliding_ids() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        let existing = store.add(NewItem::basic("Original", 7, 1.0)).unwrap();

        let export = dir.path().join("copy.csv");
        assert_eq!(store.export_to(&export).unwrap(), 1);

        let summary = store.import_from(&export, ImportMode::Merge).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.reassigned_ids, 1);
        assert_eq!(store.len(), 2);

        let ids: HashSet<_> = store.items().iter().map(Item::id).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.find(existing).unwrap().name(), "Original");
        assert_eq!(store.items()[1].id(), ItemId::new(2));
    }

    #[test]
    fn import_of_missing_file_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("Keep", 7, 1.0)).unwrap();

        let err = store
            .import_from(dir.path().join("nope.csv"), ImportMode::Replace)
            .unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_save_is_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("inventory.csv");
        let mut store = InventoryStore::open_at(&path).unwrap();

        let id = store.add(NewItem::basic("Still here", 1, 1.0)).unwrap();
        assert!(store.has_unsaved_changes());
        assert!(store.find(id).is_some());
        assert!(matches!(store.save(), Err(StoreError::Write { .. })));

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        store.save().unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn export_writes_header_and_items() {
        let dir = tempdir().unwrap();
        let mut store = open_in(&dir);
        store.add(NewItem::basic("Widget", 1, 1.0)).unwrap();

        let out = dir.path().join("export.csv");
        store.export_to(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(codec::header().as_str()));
        assert!(lines.next().unwrap().starts_with("1,Widget,General,"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: ids returned by `add` strictly increase, deletes included.
        #[test]
        fn add_ids_strictly_increase(ops in prop::collection::vec(any::<bool>(), 1..30)) {
            let dir = tempdir().unwrap();
            let mut store = open_in(&dir);
            let mut last: Option<ItemId> = None;

            for add in ops {
                if add || store.is_empty() {
                    let id = store.add(NewItem::basic("x", 1, 1.0)).unwrap();
                    if let Some(prev) = last {
                        prop_assert!(id > prev);
                    }
                    last = Some(id);
                } else {
                    let id = store.items()[0].id();
                    let before = store.len();
                    store.delete(id).unwrap();
                    prop_assert_eq!(store.len(), before - 1);
                    prop_assert!(store.find(id).is_none());
                }
            }
        }
    }
}
