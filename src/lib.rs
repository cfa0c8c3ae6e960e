//! vehicles - Vehicle records with live price and address enrichment
//!
//! A record service that stores vehicles and, on every read, attaches a
//! current price and a human-readable address fetched from two external
//! services.
//!
//! # Architecture
//!
//! Enrichment is never persisted:
//! - Stored records carry only the durable fields (no price, no address)
//! - Price is required; a failed lookup fails the operation
//! - Address is optional; a failed lookup yields "Address not found"
//!
//! # Modules
//!
//! - `adapters`: Price and address clients (HTTP)
//! - `core`: Vehicle service and stores (memory, SQLite)
//! - `domain`: Data structures (Vehicle, Location, Price)
//! - `pricing`: In-process pricing service
//! - `server`: HTTP JSON APIs
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Start the pricing service and the record API
//! vehicles pricing &
//! vehicles serve
//!
//! # Create a vehicle
//! vehicles save --input car.json
//!
//! # Show it with fresh price and address
//! vehicles get 1
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod pricing;
pub mod server;

// Re-export main types at crate root for convenience
pub use core::{VehicleError, VehicleService, VehicleStore};
pub use domain::{Condition, Details, Location, Vehicle, VehicleId, VehicleInput};
pub use pricing::PricingService;
