//! Vehicle records.
//!
//! A vehicle has two disjoint groups of attributes:
//! - durable fields, owned by the store ([`StoredVehicle`])
//! - transient fields, computed on every response ([`Vehicle`])
//!
//! Only `StoredVehicle` and `VehicleDraft` ever reach the store. A `Vehicle`
//! is built from a stored record plus enrichment results and has no way back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::location::{Coordinates, Location};

/// Store-assigned vehicle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub i64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VehicleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for VehicleId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Condition of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Used => "USED",
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "USED" => Ok(Self::Used),
            other => Err(format!("unknown condition '{}'", other)),
        }
    }
}

/// Vehicle manufacturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub code: i32,
    pub name: String,
}

impl Manufacturer {
    pub fn new(code: i32, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// Descriptive vehicle fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<Manufacturer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_doors: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_color: Option<String>,

    /// Caller fields without a dedicated slot, kept as given
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Details {
    /// Details with only the manufacturer set
    pub fn for_manufacturer(manufacturer: Manufacturer) -> Self {
        Self {
            manufacturer: Some(manufacturer),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_mileage(mut self, mileage: u32) -> Self {
        self.mileage = Some(mileage);
        self
    }

    /// Set a field outside the fixed set, e.g. `make`
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// The durable part of a vehicle, exactly as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVehicle {
    pub id: VehicleId,
    pub details: Details,
    pub condition: Condition,
    pub location: Coordinates,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// A write handed to the store
///
/// `id: None` asks the store to insert a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDraft {
    pub id: Option<VehicleId>,
    pub details: Details,
    pub condition: Condition,
    pub location: Coordinates,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl VehicleDraft {
    /// A draft for a record that does not exist yet
    pub fn new(details: Details, condition: Condition, location: Coordinates) -> Self {
        Self {
            id: None,
            details,
            condition,
            location,
            created_at: None,
            modified_at: None,
        }
    }
}

impl From<StoredVehicle> for VehicleDraft {
    fn from(stored: StoredVehicle) -> Self {
        Self {
            id: Some(stored.id),
            details: stored.details,
            condition: stored.condition,
            location: stored.location,
            created_at: Some(stored.created_at),
            modified_at: stored.modified_at,
        }
    }
}

/// A create-or-update request from a caller
///
/// The `location` may carry address fields from an earlier response; only
/// the coordinates are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    #[serde(default)]
    pub id: Option<VehicleId>,

    #[serde(default)]
    pub details: Details,

    pub condition: Condition,

    pub location: Coordinates,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl VehicleInput {
    pub fn new(details: Details, condition: Condition, location: Coordinates) -> Self {
        Self {
            id: None,
            details,
            condition,
            location,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: VehicleId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// A vehicle as returned to callers, with fresh price and address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub details: Details,
    pub condition: Condition,
    pub location: Location,
    pub price: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Vehicle {
    /// Merge a stored record with its enrichment results
    pub fn enriched(stored: StoredVehicle, price: String, location: Location) -> Self {
        Self {
            id: stored.id,
            details: stored.details,
            condition: stored.condition,
            location,
            price,
            created_at: stored.created_at,
            modified_at: stored.modified_at,
        }
    }

    /// The coordinates this vehicle was stored with
    pub fn coordinates(&self) -> Coordinates {
        self.location.coordinates()
    }
}
