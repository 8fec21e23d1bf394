//! Item identifiers and the allocator that hands them out.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory item.
///
/// Unique for the lifetime of a store and never reused, even after delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ItemId> for u64 {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("ItemId {s:?}: {e}")))?;
        Ok(Self(value))
    }
}

/// Monotonic source of [`ItemId`]s.
///
/// Owned by whoever owns the item collection. Ids start at 1; every id ever
/// observed (e.g. while loading persisted items) pushes the counter past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }

    /// Make sure `id` (and everything below it) is never handed out again.
    pub fn observe(&mut self, id: ItemId) {
        if id.0 >= self.next {
            self.next = id.0.saturating_add(1);
        }
    }

    /// The id the next call to [`allocate`](Self::allocate) returns.
    pub fn peek(&self) -> ItemId {
        ItemId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn allocator_starts_at_one() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), ItemId::new(1));
        assert_eq!(ids.allocate(), ItemId::new(2));
    }

    #[test]
    fn observe_skips_past_seen_ids() {
        let mut ids = IdAllocator::new();
        ids.observe(ItemId::new(41));
        assert_eq!(ids.allocate(), ItemId::new(42));

        // Lower ids do not move the counter back.
        ids.observe(ItemId::new(7));
        assert_eq!(ids.peek(), ItemId::new(43));
    }

    #[test]
    fn parses_from_str() {
        assert_eq!(" 12 ".parse::<ItemId>().unwrap(), ItemId::new(12));
        assert!(matches!(
            "abc".parse::<ItemId>(),
            Err(DomainError::InvalidId(_))
        ));
        assert!("-3".parse::<ItemId>().is_err());
    }

    proptest! {
        /// Every allocated id is strictly greater than all ids seen before it.
        #[test]
        fn allocation_is_strictly_increasing(
            observed in prop::collection::vec(prop::option::of(0u64..10_000), 1..50)
        ) {
            let mut ids = IdAllocator::new();
            let mut max_seen = 0u64;

            for step in observed {
                match step {
                    Some(v) => {
                        ids.observe(ItemId::new(v));
                        max_seen = max_seen.max(v);
                    }
                    None => {
                        let id = ids.allocate().get();
                        prop_assert!(id > max_seen);
                        max_seen = id;
                    }
                }
            }
        }
    }
}
