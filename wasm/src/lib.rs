//! WebAssembly module for the Inventory Management Platform
//!
//! Provides client-side computation for:
//! - Chart axis buckets (day / week / month)
//! - Share normalization for pie charts
//! - Net weight and net value previews on the weighing form

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{datetime_range, normalized};

/// One chart bucket as plain dates
#[derive(Debug, Serialize, PartialEq)]
pub struct PeriodBounds {
    pub start: String,
    pub end: String,
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid date {:?}: {}", value, e))
}

fn bounds_json(start: &str, end: &str, resolution: &str) -> Result<String, String> {
    let resolution: Resolution = resolution.parse().map_err(|e: ParseResolutionError| e.to_string())?;
    let bounds: Vec<PeriodBounds> = datetime_range(parse_instant(start)?, parse_instant(end)?, resolution)
        .map(|p| PeriodBounds {
            start: p.start_label(),
            end: p.end_label(),
        })
        .collect();
    serde_json::to_string(&bounds).map_err(|e| e.to_string())
}

fn shares_json(values_json: &str) -> Result<String, String> {
    let values: Vec<Decimal> =
        serde_json::from_str(values_json).map_err(|e| format!("Invalid values JSON: {}", e))?;
    serde_json::to_string(&normalized(&values)).map_err(|e| e.to_string())
}

fn to_decimal(value: f64) -> Result<Decimal, String> {
    Decimal::try_from(value).map_err(|_| format!("Invalid number {}", value))
}

fn to_f64(value: Decimal) -> Result<f64, String> {
    value
        .to_f64()
        .ok_or_else(|| format!("{} is out of range", value))
}

fn weight_preview(gross_weight: f64, tare_weight: f64) -> Result<f64, String> {
    to_f64(shared::net_weight(to_decimal(gross_weight)?, to_decimal(tare_weight)?))
}

fn value_preview(gross_weight: f64, tare_weight: f64, unit_price: f64) -> Result<f64, String> {
    to_f64(shared::net_value(
        to_decimal(gross_weight)?,
        to_decimal(tare_weight)?,
        to_decimal(unit_price)?,
    ))
}

/// Buckets covering `start` through `end` as a JSON list of `{start, end}` dates
#[wasm_bindgen]
pub fn period_bounds(start: &str, end: &str, resolution: &str) -> Result<String, JsValue> {
    bounds_json(start, end, resolution).map_err(|e| JsValue::from_str(&e))
}

/// Each value of a JSON number list as a fraction of the list total
#[wasm_bindgen]
pub fn normalize_shares(values_json: &str) -> Result<String, JsValue> {
    shares_json(values_json).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn net_weight(gross_weight: f64, tare_weight: f64) -> Result<f64, JsValue> {
    weight_preview(gross_weight, tare_weight).map_err(|e| JsValue::from_str(&e))
}

/// Net value rounded to 2 places
#[wasm_bindgen]
pub fn net_value(gross_weight: f64, tare_weight: f64, unit_price: f64) -> Result<f64, JsValue> {
    value_preview(gross_weight, tare_weight, unit_price).map_err(|e| JsValue::from_str(&e))
}
