//! Validation utilities for the Inventory Management Platform

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::periods::datetime_range;
use crate::types::Resolution;

// ============================================================================
// Report Input Validations
// ============================================================================

/// Validate that a report window is not inverted
pub fn validate_date_range(date_from: DateTime<Utc>, date_to: DateTime<Utc>) -> Result<(), &'static str> {
    if date_from > date_to {
        return Err("date_from must not be after date_to");
    }
    Ok(())
}

/// Validate that a report window does not produce more than `max_periods` buckets
pub fn validate_period_count(
    date_from: DateTime<Utc>,
    date_to: DateTime<Utc>,
    resolution: Resolution,
    max_periods: usize,
) -> Result<(), &'static str> {
    if datetime_range(date_from, date_to, resolution).nth(max_periods).is_some() {
        return Err("Requested span contains too many periods");
    }
    Ok(())
}

// ============================================================================
// Weighing Validations
// ============================================================================

/// Validate gross and tare weights of a weighing
pub fn validate_weighing(gross_weight: Decimal, tare_weight: Decimal) -> Result<(), &'static str> {
    if gross_weight < Decimal::ZERO {
        return Err("Gross weight cannot be negative");
    }
    if tare_weight < Decimal::ZERO {
        return Err("Tare weight cannot be negative");
    }
    Ok(())
}

/// Validate unit price
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), &'static str> {
    if unit_price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}
