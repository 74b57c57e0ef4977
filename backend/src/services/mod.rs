//! Business logic services for the Inventory Management Platform

pub mod inventory;
pub mod reporting;
pub mod valuation;

pub use inventory::InventoryService;
pub use reporting::ReportingService;
pub use valuation::ValuationService;
