//! Vehicle locations.
//!
//! Coordinates are durable; the human-readable address is resolved on every
//! response and never stored.

use serde::{Deserialize, Serialize};

/// Placeholder address used when the maps lookup fails
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Latitude/longitude pair as stored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Address returned by the maps service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub zip: Option<String>,
}

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            city: None,
            state: None,
            zip: None,
        }
    }
}

/// Coordinates plus their resolved address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Location {
    /// A location whose address was resolved
    pub fn resolved(coordinates: Coordinates, address: Address) -> Self {
        Self {
            lat: coordinates.lat,
            lon: coordinates.lon,
            address: address.address,
            city: address.city,
            state: address.state,
            zip: address.zip,
        }
    }

    /// A location carrying the placeholder address
    pub fn unresolved(coordinates: Coordinates) -> Self {
        Self {
            lat: coordinates.lat,
            lon: coordinates.lon,
            address: ADDRESS_NOT_FOUND.to_string(),
            city: None,
            state: None,
            zip: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// Whether this location carries the placeholder address
    pub fn is_unresolved(&self) -> bool {
        self.address == ADDRESS_NOT_FOUND
    }
}
