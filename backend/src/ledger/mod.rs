//! Read access to the transaction ledger
//!
//! The valuation engine never talks to storage directly. It asks a [`Ledger`]
//! for aggregates over transactions selected by a [`LedgerQuery`].

mod memory;
mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{Direction, EntityFilter, Material, MaterialGroup, TransactionListing};
use uuid::Uuid;

use crate::error::AppResult;

/// Selects the transactions an aggregate runs over. Time bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LedgerQuery {
    pub direction: Option<Direction>,
    pub filter: Option<EntityFilter>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl LedgerQuery {
    /// Everything up to and including `as_of`
    pub fn until(as_of: DateTime<Utc>) -> Self {
        Self {
            end_time: Some(as_of),
            ..Self::default()
        }
    }

    /// Everything in `[from, to]`
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(from),
            end_time: Some(to),
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_filter(mut self, filter: Option<EntityFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Whether a transaction with these attributes is selected
    pub fn matches(
        &self,
        direction: Direction,
        material_id: Uuid,
        material_group_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> bool {
        self.direction.map_or(true, |d| d == direction)
            && self
                .filter
                .map_or(true, |f| f.matches(material_id, material_group_id))
            && self.start_time.map_or(true, |start| timestamp >= start)
            && self.end_time.map_or(true, |end| timestamp <= end)
    }
}

/// Sums over the transactions selected by a query
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    /// Σ net weight
    pub net_weight: Decimal,
    /// Σ net value, each value rounded to 2 places before summing
    pub net_value: Decimal,
    /// Σ net weight × unit price, unrounded
    pub weighted_price: Decimal,
}

impl LedgerTotals {
    /// Fold one weighing into the sums
    pub fn add(self, gross_weight: Decimal, tare_weight: Decimal, unit_price: Decimal) -> Self {
        let net_weight = shared::net_weight(gross_weight, tare_weight);
        Self {
            net_weight: self.net_weight + net_weight,
            net_value: self.net_value + shared::net_value(gross_weight, tare_weight, unit_price),
            weighted_price: self.weighted_price + net_weight * unit_price,
        }
    }
}

/// The slice of a transaction needed to replay the running average price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
    pub net_weight: Decimal,
    pub unit_price: Decimal,
}

/// Filter for the transaction listing.
///
/// `directions: None` selects every direction, `Some(vec![])` selects nothing.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub directions: Option<Vec<Direction>>,
    pub material_group_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn matches(
        &self,
        direction: Direction,
        material_id: Uuid,
        material_group_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> bool {
        self.directions
            .as_ref()
            .map_or(true, |dirs| dirs.contains(&direction))
            && self.material_group_id.map_or(true, |id| id == material_group_id)
            && self.material_id.map_or(true, |id| id == material_id)
            && self.date_from.map_or(true, |from| timestamp >= from)
            && self.date_to.map_or(true, |to| timestamp <= to)
    }
}

/// Read-only query interface over the transaction store
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Aggregate sums over the selected transactions; zeros when none match
    async fn totals(&self, query: &LedgerQuery) -> AppResult<LedgerTotals>;

    /// Selected transactions in ascending timestamp order
    async fn movements(&self, query: &LedgerQuery) -> AppResult<Vec<Movement>>;

    /// All material groups ordered by name
    async fn material_groups(&self) -> AppResult<Vec<MaterialGroup>>;

    /// Materials ordered by name, optionally restricted to one group
    async fn materials(&self, material_group_id: Option<Uuid>) -> AppResult<Vec<Material>>;

    async fn find_material_group(&self, id: Uuid) -> AppResult<Option<MaterialGroup>>;

    async fn find_material(&self, id: Uuid) -> AppResult<Option<Material>>;

    /// Transaction listing, newest first
    async fn transactions(&self, filter: &TransactionFilter) -> AppResult<Vec<TransactionListing>>;

    /// Whether the backing store is reachable
    async fn ping(&self) -> bool;
}
