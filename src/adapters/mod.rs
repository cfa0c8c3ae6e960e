//! Adapter interfaces for external collaborators.
//!
//! Adapters provide a unified interface for the two services a vehicle is
//! enriched from:
//! - pricing: resolves a vehicle id to a price (failures are errors)
//! - maps: resolves coordinates to an address (failures degrade to a placeholder)

pub mod maps;
pub mod pricing;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Address, Coordinates, Location, VehicleId};

// Re-export the HTTP clients
pub use maps::MapsClient;
pub use pricing::HttpPriceClient;

/// Errors from the pricing collaborator
#[derive(Debug, Error)]
pub enum PriceError {
    #[error("No price on record for vehicle {0}")]
    NotFound(VehicleId),

    #[error("Pricing service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Pricing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed price response: {0}")]
    Malformed(String),

    #[error("Pricing request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the maps collaborator
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Maps service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Maps request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed address response: {0}")]
    Malformed(String),
}

/// Source of vehicle prices
#[async_trait]
pub trait PriceClient: Send + Sync {
    /// Human-readable client name
    fn name(&self) -> &str;

    /// Current price for a vehicle, as provider-formatted text
    async fn get_price(&self, vehicle_id: VehicleId) -> Result<String, PriceError>;
}

/// Source of addresses for coordinates
#[async_trait]
pub trait LocationClient: Send + Sync {
    /// Human-readable client name
    fn name(&self) -> &str;

    /// Resolve coordinates to an address
    async fn lookup(&self, coordinates: Coordinates) -> Result<Address, LocationError>;

    /// Resolve coordinates to a location, never failing
    ///
    /// Lookup errors are logged and replaced by the placeholder address.
    async fn get_address(&self, coordinates: Coordinates) -> Location {
        match self.lookup(coordinates).await {
            Ok(address) => Location::resolved(coordinates, address),
            Err(e) => {
                warn!(
                    client = self.name(),
                    lat = coordinates.lat,
                    lon = coordinates.lon,
                    error = %e,
                    "Address lookup failed, using placeholder"
                );
                Location::unresolved(coordinates)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenMaps;

    #[async_trait]
    impl LocationClient for BrokenMaps {
        fn name(&self) -> &str {
            "broken"
        }

        async fn lookup(&self, _coordinates: Coordinates) -> Result<Address, LocationError> {
            Err(LocationError::Malformed("no body".to_string()))
        }
    }

    struct FixedMaps;

    #[async_trait]
    impl LocationClient for FixedMaps {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn lookup(&self, _coordinates: Coordinates) -> Result<Address, LocationError> {
            Ok(Address::new("1 Main St"))
        }
    }

    #[tokio::test]
    async fn test_get_address_degrades_on_error() {
        let coords = Coordinates::new(10.0, 20.0);
        let location = BrokenMaps.get_address(coords).await;

        assert!(location.is_unresolved());
        assert_eq!(location.coordinates(), coords);
    }

    #[tokio::test]
    async fn test_get_address_passes_through_success() {
        let location = FixedMaps.get_address(Coordinates::new(0.0, 0.0)).await;
        assert_eq!(location.address, "1 Main St");
    }
}
