//! Domain models for the Inventory Management Platform

mod inventory;
mod material;

pub use inventory::*;
pub use material::*;
