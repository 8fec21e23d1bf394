use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::Serialize;

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

/// Minimum stock threshold used when none is given.
pub const DEFAULT_MINIMUM_STOCK: i64 = 5;

/// Look-ahead window (in days) for "expiring soon".
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

/// Category assigned by the quick-add path.
pub const DEFAULT_CATEGORY: &str = "General";

/// Largest accepted money amount. Amounts are kept in whole cents, which stay
/// exact in an `f64` below this bound.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Current time at the precision items are persisted with (whole seconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Single status label for an item, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Low,
    ExpiringSoon,
    Expired,
    Ok,
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            StockStatus::Low => "LOW",
            StockStatus::ExpiringSoon => "EXP SOON",
            StockStatus::Expired => "EXPIRED",
            StockStatus::Ok => "OK",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.label())
    }
}

/// Input for creating an item. The store assigns id, barcode and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub cost: f64,
    pub selling_price: f64,
    pub supplier: String,
    pub location: String,
    pub minimum_stock: i64,
    pub description: String,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        cost: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            cost,
            selling_price: 0.0,
            supplier: String::new(),
            location: String::new(),
            minimum_stock: DEFAULT_MINIMUM_STOCK,
            description: String::new(),
            expiry_date: None,
        }
    }

    /// Quick-add form: name, quantity and cost in the default category.
    pub fn basic(name: impl Into<String>, quantity: i64, cost: f64) -> Self {
        Self::new(name, DEFAULT_CATEGORY, quantity, cost)
    }

    pub fn with_selling_price(mut self, selling_price: f64) -> Self {
        self.selling_price = selling_price;
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_minimum_stock(mut self, minimum_stock: i64) -> Self {
        self.minimum_stock = minimum_stock;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_expiry_date(mut self, expiry_date: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// Partial update: only the fields that are `Some` are changed.
///
/// `expiry_date: Some(None)` clears the expiry date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub minimum_stock: Option<i64>,
    pub cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub expiry_date: Option<Option<DateTime<Utc>>>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn minimum_stock(mut self, minimum_stock: i64) -> Self {
        self.minimum_stock = Some(minimum_stock);
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn selling_price(mut self, selling_price: f64) -> Self {
        self.selling_price = Some(selling_price);
        self
    }

    pub fn expiry_date(mut self, expiry_date: Option<DateTime<Utc>>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// Every persisted field of an item, as stored on disk.
///
/// Used to rebuild an item without assigning a new identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub supplier: String,
    pub barcode: String,
    pub quantity: i64,
    pub minimum_stock: i64,
    pub cost: f64,
    pub selling_price: f64,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub location: String,
    pub description: String,
}

/// Entity: one inventory record.
///
/// Invariants: `name` is not blank, counts and amounts are never negative,
/// `id`, `barcode` and `date_added` never change after creation. Every
/// mutation stamps `last_modified`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    id: ItemId,
    name: String,
    category: String,
    supplier: String,
    barcode: String,
    quantity: i64,
    minimum_stock: i64,
    cost: f64,
    selling_price: f64,
    date_added: DateTime<Utc>,
    last_modified: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    location: String,
    description: String,
}

impl Item {
    /// Create a brand new item.
    pub fn create(
        id: ItemId,
        barcode: impl Into<String>,
        new: NewItem,
        at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_name(&new.name)?;
        validate_count("quantity", new.quantity)?;
        validate_count("minimum stock", new.minimum_stock)?;
        let cost = to_cents("cost", new.cost)?;
        let selling_price = to_cents("selling price", new.selling_price)?;
        validate_expiry(new.expiry_date)?;

        Ok(Self {
            id,
            name: new.name,
            category: new.category,
            supplier: new.supplier,
            barcode: barcode.into(),
            quantity: new.quantity,
            minimum_stock: new.minimum_stock,
            cost,
            selling_price,
            date_added: at,
            last_modified: at,
            expiry_date: new.expiry_date,
            location: new.location,
            description: new.description,
        })
    }

    /// Rebuild an item from persisted state, keeping its identity and timestamps.
    pub fn restore(s: ItemSnapshot) -> DomainResult<Self> {
        validate_name(&s.name)?;
        validate_count("quantity", s.quantity)?;
        validate_count("minimum stock", s.minimum_stock)?;
        let cost = to_cents("cost", s.cost)?;
        let selling_price = to_cents("selling price", s.selling_price)?;
        validate_expiry(s.expiry_date)?;

        Ok(Self {
            id: s.id,
            name: s.name,
            category: s.category,
            supplier: s.supplier,
            barcode: s.barcode,
            quantity: s.quantity,
            minimum_stock: s.minimum_stock,
            cost,
            selling_price,
            date_added: s.date_added,
            last_modified: s.last_modified,
            expiry_date: s.expiry_date,
            location: s.location,
            description: s.description,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn minimum_stock(&self) -> i64 {
        self.minimum_stock
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn selling_price(&self) -> f64 {
        self.selling_price
    }

    pub fn date_added(&self) -> DateTime<Utc> {
        self.date_added
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn expiry_date(&self) -> Option<DateTime<Utc>> {
        self.expiry_date
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// quantity × cost
    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.cost
    }

    /// quantity × selling price
    pub fn potential_revenue(&self) -> f64 {
        self.quantity as f64 * self.selling_price
    }

    pub fn profit(&self) -> f64 {
        (self.selling_price - self.cost) * self.quantity as f64
    }

    /// Markup over cost in percent; 0 when the item costs nothing.
    pub fn profit_margin(&self) -> f64 {
        if self.cost == 0.0 {
            return 0.0;
        }
        (self.selling_price - self.cost) / self.cost * 100.0
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.minimum_stock
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }

    /// True when the item expires within `days` of `now` (already expired included).
    pub fn is_expiring_within(&self, now: DateTime<Utc>, days: i64) -> bool {
        let horizon = TimeDelta::try_days(days).and_then(|d| now.checked_add_signed(d));
        self.expiry_date
            .is_some_and(|expiry| horizon.is_none_or(|h| expiry <= h))
    }

    /// Status label: low stock wins over expiring soon, which wins over expired.
    pub fn status_at(&self, now: DateTime<Utc>, expiry_window_days: i64) -> StockStatus {
        if self.is_low_stock() {
            StockStatus::Low
        } else if self.is_expiring_within(now, expiry_window_days) {
            StockStatus::ExpiringSoon
        } else if self.is_expired_at(now) {
            StockStatus::Expired
        } else {
            StockStatus::Ok
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>, at: DateTime<Utc>) -> DomainResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.touch(at);
        Ok(())
    }

    pub fn set_category(&mut self, category: impl Into<String>, at: DateTime<Utc>) {
        self.category = category.into();
        self.touch(at);
    }

    pub fn set_supplier(&mut self, supplier: impl Into<String>, at: DateTime<Utc>) {
        self.supplier = supplier.into();
        self.touch(at);
    }

    pub fn set_location(&mut self, location: impl Into<String>, at: DateTime<Utc>) {
        self.location = location.into();
        self.touch(at);
    }

    pub fn set_description(&mut self, description: impl Into<String>, at: DateTime<Utc>) {
        self.description = description.into();
        self.touch(at);
    }

    pub fn set_quantity(&mut self, quantity: i64, at: DateTime<Utc>) -> DomainResult<()> {
        validate_count("quantity", quantity)?;
        self.quantity = quantity;
        self.touch(at);
        Ok(())
    }

    pub fn set_minimum_stock(&mut self, minimum_stock: i64, at: DateTime<Utc>) -> DomainResult<()> {
        validate_count("minimum stock", minimum_stock)?;
        self.minimum_stock = minimum_stock;
        self.touch(at);
        Ok(())
    }

    pub fn set_cost(&mut self, cost: f64, at: DateTime<Utc>) -> DomainResult<()> {
        self.cost = to_cents("cost", cost)?;
        self.touch(at);
        Ok(())
    }

    pub fn set_selling_price(
        &mut self,
        selling_price: f64,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.selling_price = to_cents("selling price", selling_price)?;
        self.touch(at);
        Ok(())
    }

    pub fn set_expiry_date(
        &mut self,
        expiry_date: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        validate_expiry(expiry_date)?;
        self.expiry_date = expiry_date;
        self.touch(at);
        Ok(())
    }

    /// Add `delta` (possibly negative) to the quantity; returns the new quantity.
    pub fn update_quantity(&mut self, delta: i64, at: DateTime<Utc>) -> DomainResult<i64> {
        let quantity = self
            .quantity
            .checked_add(delta)
            .filter(|q| *q >= 0)
            .ok_or_else(|| DomainError::validation("cannot reduce quantity below zero"))?;
        self.quantity = quantity;
        self.touch(at);
        Ok(quantity)
    }

    /// Apply a partial update.
    ///
    /// Every supplied value is validated before anything changes, so a failed
    /// patch leaves the item untouched. Returns `false` for an empty patch.
    pub fn apply(&mut self, patch: ItemPatch, at: DateTime<Utc>) -> DomainResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(quantity) = patch.quantity {
            validate_count("quantity", quantity)?;
        }
        if let Some(minimum_stock) = patch.minimum_stock {
            validate_count("minimum stock", minimum_stock)?;
        }
        let cost = patch.cost.map(|v| to_cents("cost", v)).transpose()?;
        let selling_price = patch
            .selling_price
            .map(|v| to_cents("selling price", v))
            .transpose()?;
        if let Some(expiry_date) = patch.expiry_date {
            validate_expiry(expiry_date)?;
        }

        let ItemPatch {
            name,
            category,
            supplier,
            location,
            description,
            quantity,
            minimum_stock,
            cost: _,
            selling_price: _,
            expiry_date,
        } = patch;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = supplier {
            self.supplier = v;
        }
        if let Some(v) = location {
            self.location = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = quantity {
            self.quantity = v;
        }
        if let Some(v) = minimum_stock {
            self.minimum_stock = v;
        }
        if let Some(v) = cost {
            self.cost = v;
        }
        if let Some(v) = selling_price {
            self.selling_price = v;
        }
        if let Some(v) = expiry_date {
            self.expiry_date = v;
        }

        self.touch(at);
        Ok(true)
    }

    /// Give the item a new identity (used when an imported id collides).
    pub(crate) fn reassign_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.last_modified = at;
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("item name cannot be empty"));
    }
    Ok(())
}

fn validate_count(field: &str, value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

/// Validate a money amount and round it to whole cents.
fn to_cents(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    if value >= MAX_AMOUNT {
        return Err(DomainError::validation(format!(
            "{field} must be below {MAX_AMOUNT:.0}"
        )));
    }
    Ok((value * 100.0).round() / 100.0)
}

/// Second 0 of the Unix epoch is the on-disk marker for "no expiry".
fn validate_expiry(expiry_date: Option<DateTime<Utc>>) -> DomainResult<()> {
    if expiry_date.is_some_and(|d| d.timestamp() == 0) {
        return Err(DomainError::validation(
            "expiry date cannot be 1970-01-01T00:00:00Z",
        ));
    }
    Ok(())
}
