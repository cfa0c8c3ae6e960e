//! Vehicle service: store access plus enrichment.
//!
//! Every record handed back to a caller is enriched fresh:
//! - price is a required enrichment; a failure or timeout aborts the operation
//! - address is an optional enrichment; a failure or timeout yields the placeholder
//!
//! Nothing is cached between calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{LocationClient, PriceClient, PriceError};
use crate::domain::{
    Coordinates, Location, StoredVehicle, Vehicle, VehicleDraft, VehicleId, VehicleInput,
};

use super::error::VehicleError;
use super::store::VehicleStore;

/// How `created_at` is treated when an existing vehicle is updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedAtPolicy {
    /// Keep the stored value; the caller's value is ignored
    #[default]
    Preserve,

    /// Take the caller's value when given (legacy behaviour)
    FromRequest,
}

impl CreatedAtPolicy {
    /// Pick the `created_at` for an update stamped at `modified_at`
    ///
    /// The result never lies after `modified_at`.
    pub fn resolve(
        self,
        stored: DateTime<Utc>,
        requested: Option<DateTime<Utc>>,
        modified_at: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let created_at = match self {
            Self::Preserve => stored,
            Self::FromRequest => requested.unwrap_or(stored),
        };
        created_at.min(modified_at)
    }
}

/// Tuning for enrichment calls
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    /// Deadline for one price lookup
    pub price_timeout: Duration,

    /// Deadline for one address lookup
    pub location_timeout: Duration,

    /// Records enriched at once by `list` (1 = one after another)
    pub list_concurrency: usize,

    /// Update rule for `created_at`
    pub created_at_on_update: CreatedAtPolicy,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            price_timeout: Duration::from_millis(3000),
            location_timeout: Duration::from_millis(3000),
            list_concurrency: 1,
            created_at_on_update: CreatedAtPolicy::Preserve,
        }
    }
}

/// Vehicle operations backed by a store and two enrichment clients
pub struct VehicleService {
    store: Arc<dyn VehicleStore>,
    prices: Arc<dyn PriceClient>,
    locations: Arc<dyn LocationClient>,
    settings: EnrichmentSettings,
}

impl VehicleService {
    /// Create a service from its collaborators
    pub fn new(
        store: Arc<dyn VehicleStore>,
        prices: Arc<dyn PriceClient>,
        locations: Arc<dyn LocationClient>,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            store,
            prices,
            locations,
            settings,
        }
    }

    /// All vehicles in store order, each freshly enriched
    ///
    /// A price failure on any record fails the whole list. With
    /// `list_concurrency > 1` the reported failure is still the one of the
    /// earliest record in store order, and outstanding lookups are dropped.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Vehicle>, VehicleError> {
        let stored = self.store.find_all().await?;
        info!(count = stored.len(), "Listing vehicles");

        let pending: Vec<_> = stored
            .into_iter()
            .map(|vehicle| self.enrich(vehicle))
            .collect();

        stream::iter(pending)
            .buffered(self.settings.list_concurrency.max(1))
            .try_collect()
            .await
    }

    /// One vehicle, freshly enriched
    #[instrument(skip(self), fields(id = %id))]
    pub async fn find_by_id(&self, id: VehicleId) -> Result<Vehicle, VehicleError> {
        let stored = self.store.find_by_id(id).await?;
        self.enrich(stored).await
    }

    /// Create (no id) or update (id present) a vehicle, then enrich it
    ///
    /// The write is not rolled back if enrichment of the result fails.
    #[instrument(skip(self, input), fields(id = ?input.id))]
    pub async fn save(&self, input: VehicleInput) -> Result<Vehicle, VehicleError> {
        let stored = match input.id {
            Some(id) => self.update(id, input).await?,
            None => self.create(input).await?,
        };

        self.enrich(stored).await
    }

    /// Delete a vehicle that must exist
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: VehicleId) -> Result<(), VehicleError> {
        self.store.find_by_id(id).await?;
        self.store.delete(id).await?;

        info!("Vehicle deleted");
        Ok(())
    }

    async fn create(&self, input: VehicleInput) -> Result<StoredVehicle, VehicleError> {
        let draft = VehicleDraft::new(input.details, input.condition, input.location);
        let stored = self.store.save(draft).await?;

        info!(id = %stored.id, "Vehicle created");
        Ok(stored)
    }

    async fn update(
        &self,
        id: VehicleId,
        input: VehicleInput,
    ) -> Result<StoredVehicle, VehicleError> {
        let existing = self.store.find_by_id(id).await?;

        let modified_at = Utc::now();
        let created_at = self.settings.created_at_on_update.resolve(
            existing.created_at,
            input.created_at,
            modified_at,
        );

        // Coordinates are not part of the update merge
        let draft = VehicleDraft {
            id: Some(id),
            details: input.details,
            condition: input.condition,
            location: existing.location,
            created_at: Some(created_at),
            modified_at: Some(modified_at),
        };
        let stored = self.store.save(draft).await?;

        info!(%id, "Vehicle updated");
        Ok(stored)
    }

    /// Attach a fresh price and address to a stored record
    ///
    /// A price failure returns at once and drops the pending address lookup.
    async fn enrich(&self, stored: StoredVehicle) -> Result<Vehicle, VehicleError> {
        let (price, location) = tokio::try_join!(
            self.required_price(stored.id),
            async { Ok::<_, VehicleError>(self.optional_location(stored.location).await) },
        )?;

        debug!(id = %stored.id, %price, address = %location.address, "Vehicle enriched");
        Ok(Vehicle::enriched(stored, price, location))
    }

    async fn required_price(&self, id: VehicleId) -> Result<String, VehicleError> {
        let deadline = self.settings.price_timeout;

        let result = match tokio::time::timeout(deadline, self.prices.get_price(id)).await {
            Ok(result) => result,
            Err(_) => Err(PriceError::Timeout(deadline)),
        };

        result.map_err(|source| {
            error!(%id, client = self.prices.name(), error = %source, "Price lookup failed");
            VehicleError::PriceUnavailable { id, source }
        })
    }

    async fn optional_location(&self, coordinates: Coordinates) -> Location {
        let deadline = self.settings.location_timeout;

        match tokio::time::timeout(deadline, self.locations.get_address(coordinates)).await {
            Ok(location) => location,
            Err(_) => {
                warn!(
                    client = self.locations.name(),
                    timeout_ms = deadline.as_millis() as u64,
                    "Address lookup timed out, using placeholder"
                );
                Location::unresolved(coordinates)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_preserve_ignores_request() {
        let stored = Utc::now() - ChronoDuration::days(3);
        let requested = Utc::now() - ChronoDuration::days(30);
        let now = Utc::now();

        let created_at = CreatedAtPolicy::Preserve.resolve(stored, Some(requested), now);
        assert_eq!(created_at, stored);
    }

    #[test]
    fn test_from_request_takes_caller_value() {
        let stored = Utc::now() - ChronoDuration::days(3);
        let requested = Utc::now() - ChronoDuration::days(30);
        let now = Utc::now();

        let created_at = CreatedAtPolicy::FromRequest.resolve(stored, Some(requested), now);
        assert_eq!(created_at, requested);

        let fallback = CreatedAtPolicy::FromRequest.resolve(stored, None, now);
        assert_eq!(fallback, stored);
    }

    #[test]
    fn test_from_request_never_after_modified() {
        let stored = Utc::now() - ChronoDuration::days(3);
        let future = Utc::now() + ChronoDuration::days(365);
        let now = Utc::now();

        let created_at = CreatedAtPolicy::FromRequest.resolve(stored, Some(future), now);
        assert_eq!(created_at, now);
    }

    #[test]
    fn test_policy_yaml_names() {
        let policy: CreatedAtPolicy = serde_yaml::from_str("from_request").unwrap();
        assert_eq!(policy, CreatedAtPolicy::FromRequest);
        assert_eq!(CreatedAtPolicy::default(), CreatedAtPolicy::Preserve);
    }

    #[test]
    fn test_default_settings_are_sequential() {
        let settings = EnrichmentSettings::default();
        assert_eq!(settings.list_concurrency, 1);
        assert_eq!(settings.price_timeout, Duration::from_secs(3));
    }
}
