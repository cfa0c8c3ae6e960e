//! Price quotes as served by the pricing service.

use serde::{Deserialize, Serialize};

use super::vehicle::VehicleId;

/// A price quote for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub currency: String,
    pub price: f64,
    pub vehicle_id: VehicleId,
}

impl Price {
    pub fn new(currency: impl Into<String>, price: f64, vehicle_id: VehicleId) -> Self {
        Self {
            currency: currency.into(),
            price,
            vehicle_id,
        }
    }

    /// Text form attached to vehicles, e.g. `USD 12345.67`
    pub fn display_text(&self) -> String {
        format!("{} {:.2}", self.currency, self.price)
    }
}
