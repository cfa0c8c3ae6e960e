//! Domain types for the vehicle service.
//!
//! This module contains the core data structures:
//! - Vehicle: durable records, write requests and enriched responses
//! - Location: coordinates and resolved addresses
//! - Price: quotes from the pricing service

pub mod location;
pub mod price;
pub mod vehicle;

// Re-export commonly used types
pub use location::{Address, Coordinates, Location, ADDRESS_NOT_FOUND};
pub use price::Price;
pub use vehicle::{
    Condition, Details, Manufacturer, StoredVehicle, Vehicle, VehicleDraft, VehicleId,
    VehicleInput,
};
