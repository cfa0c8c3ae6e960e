//! HTTP client for the pricing service.
//!
//! Endpoint: GET {base}/price/{vehicle_id}

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{PriceClient, PriceError};
use crate::config::ResolvedConfig;
use crate::domain::{Price, VehicleId};

/// Pricing service client
pub struct HttpPriceClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPriceClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.pricing.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the raw price quote
    pub async fn fetch(&self, vehicle_id: VehicleId) -> Result<Price, PriceError> {
        let url = format!("{}/price/{}", self.base_url, vehicle_id);
        debug!(%url, "Requesting price");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PriceError::NotFound(vehicle_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let price: Price =
            serde_json::from_str(&body).map_err(|e| PriceError::Malformed(e.to_string()))?;

        if price.vehicle_id != vehicle_id {
            return Err(PriceError::Malformed(format!(
                "asked for vehicle {}, got a price for {}",
                vehicle_id, price.vehicle_id
            )));
        }

        Ok(price)
    }
}

#[async_trait]
impl PriceClient for HttpPriceClient {
    fn name(&self) -> &str {
        "pricing-http"
    }

    async fn get_price(&self, vehicle_id: VehicleId) -> Result<String, PriceError> {
        let price = self.fetch(vehicle_id).await?;
        Ok(price.display_text())
    }
}
