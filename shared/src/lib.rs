//! Shared types and models for the Inventory Management Platform
//!
//! This crate contains the domain types and pure helpers shared between the
//! backend, the browser charts (via WASM), and other components of the system.

pub mod models;
pub mod periods;
pub mod types;
pub mod validation;

pub use models::*;
pub use periods::*;
pub use types::*;
pub use validation::*;
