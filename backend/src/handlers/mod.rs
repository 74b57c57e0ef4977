//! HTTP handlers for the Inventory Management Platform

mod health;
mod inventory;
pub mod params;
mod reporting;

pub use health::*;
pub use inventory::*;
pub use reporting::*;
