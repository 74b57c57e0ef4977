//! Inventory movement models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Movement direction. IN increases stock, OUT decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Direction::In),
            "OUT" => Ok(Direction::Out),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// A recorded weighing. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub direction: Direction,
    pub material_id: Uuid,
    /// Ordering key for every aggregation, not the creation time
    pub timestamp: DateTime<Utc>,
    pub gross_weight: Decimal,
    pub tare_weight: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub notes: String,
}

impl Transaction {
    pub fn new(
        direction: Direction,
        material_id: Uuid,
        timestamp: DateTime<Utc>,
        gross_weight: Decimal,
        tare_weight: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            material_id,
            timestamp,
            gross_weight,
            tare_weight,
            unit_price,
            notes: String::new(),
        }
    }

    /// Gross minus tare. May be negative when recording shrinkage.
    pub fn net_weight(&self) -> Decimal {
        net_weight(self.gross_weight, self.tare_weight)
    }

    pub fn net_value(&self) -> Decimal {
        net_value(self.gross_weight, self.tare_weight, self.unit_price)
    }
}

pub fn net_weight(gross_weight: Decimal, tare_weight: Decimal) -> Decimal {
    gross_weight - tare_weight
}

/// Net weight times unit price, rounded half-to-even to 2 places
pub fn net_value(gross_weight: Decimal, tare_weight: Decimal, unit_price: Decimal) -> Decimal {
    (net_weight(gross_weight, tare_weight) * unit_price).round_dp(2)
}

/// Transaction row as shown in the transactions report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionListing {
    pub id: Uuid,
    pub transaction_type: Direction,
    pub material_group: String,
    pub material: String,
    /// `YYYY-MM-DD HH:MM`
    pub transaction_time: String,
    pub gross_weight: Decimal,
    pub tare_weight: Decimal,
    pub net_weight: Decimal,
    pub unit_price: Decimal,
    pub net_value: Decimal,
    pub notes: String,
}

impl TransactionListing {
    pub fn new(transaction: &Transaction, material_group: &str, material: &str) -> Self {
        Self {
            id: transaction.id,
            transaction_type: transaction.direction,
            material_group: material_group.to_string(),
            material: material.to_string(),
            transaction_time: transaction.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            gross_weight: transaction.gross_weight,
            tare_weight: transaction.tare_weight,
            net_weight: transaction.net_weight(),
            unit_price: transaction.unit_price,
            net_value: transaction.net_value(),
            notes: transaction.notes.clone(),
        }
    }
}
