//! Core vehicle logic.
//!
//! This module contains:
//! - Store: durable vehicle storage (SQLite and in-memory)
//! - Orchestrator: the vehicle service that enriches every returned record
//! - Error: terminal outcomes of vehicle operations

pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod sqlite;
pub mod store;

// Re-export commonly used types
pub use error::VehicleError;
pub use memory::MemoryVehicleStore;
pub use orchestrator::{CreatedAtPolicy, EnrichmentSettings, VehicleService};
pub use sqlite::SqliteVehicleStore;
pub use store::{StoreError, VehicleStore};
