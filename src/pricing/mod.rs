//! In-process pricing service.
//!
//! Holds one price quote per vehicle id. Seeded quotes are deterministic:
//! the amount is derived from a SHA-256 of the id, so a restarted service
//! quotes the same prices.
//!
//! The service is served over HTTP by `server::pricing_router` and can also
//! be plugged straight into a `VehicleService` as its `PriceClient`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::adapters::{PriceClient, PriceError};
use crate::domain::{Price, VehicleId};

/// Currency of seeded quotes
pub const DEFAULT_CURRENCY: &str = "USD";

/// Lowest seeded amount, in cents
const MIN_CENTS: u64 = 100;

/// Highest seeded amount, in cents
const MAX_CENTS: u64 = 10_000_000;

/// Errors from the pricing service
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Cannot find price for vehicle {0}")]
    NotFound(VehicleId),
}

/// Price table keyed by vehicle id
#[derive(Debug, Default)]
pub struct PricingService {
    prices: RwLock<BTreeMap<VehicleId, Price>>,
}

impl PricingService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with quotes for ids `1..=count`
    pub fn seeded(count: i64) -> Self {
        let prices = (1..=count)
            .map(VehicleId)
            .map(|id| (id, Price::new(DEFAULT_CURRENCY, seeded_amount(id), id)))
            .collect();

        Self {
            prices: RwLock::new(prices),
        }
    }

    /// Quote for one vehicle
    pub async fn quote(&self, vehicle_id: VehicleId) -> Result<Price, PricingError> {
        self.prices
            .read()
            .await
            .get(&vehicle_id)
            .cloned()
            .ok_or(PricingError::NotFound(vehicle_id))
    }

    /// All quotes in id order
    pub async fn list(&self) -> Vec<Price> {
        self.prices.read().await.values().cloned().collect()
    }

    /// Insert or replace the quote for `price.vehicle_id`
    pub async fn set_price(&self, price: Price) {
        self.prices.write().await.insert(price.vehicle_id, price);
    }

    /// Drop the quote for a vehicle
    pub async fn remove_price(&self, vehicle_id: VehicleId) -> Option<Price> {
        self.prices.write().await.remove(&vehicle_id)
    }

    pub async fn len(&self) -> usize {
        self.prices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PriceClient for PricingService {
    fn name(&self) -> &str {
        "pricing-local"
    }

    async fn get_price(&self, vehicle_id: VehicleId) -> Result<String, PriceError> {
        match self.quote(vehicle_id).await {
            Ok(price) => Ok(price.display_text()),
            Err(PricingError::NotFound(id)) => Err(PriceError::NotFound(id)),
        }
    }
}

/// Deterministic amount between 1.00 and 100000.00 for an id
pub fn seeded_amount(vehicle_id: VehicleId) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(vehicle_id.0.to_be_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let cents = MIN_CENTS + u64::from_be_bytes(head) % (MAX_CENTS - MIN_CENTS + 1);

    cents as f64 / 100.0
}
