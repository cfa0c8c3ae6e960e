//! Enrichment Integration Tests
//!
//! Exercises the vehicle service against the memory store, the local
//! pricing service and fake address clients.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use vehicles::adapters::{LocationClient, LocationError, PriceClient, PriceError};
use vehicles::core::{
    CreatedAtPolicy, EnrichmentSettings, MemoryVehicleStore, VehicleError, VehicleService,
    VehicleStore,
};
use vehicles::domain::{
    Address, Condition, Coordinates, Details, Manufacturer, Price, VehicleId, VehicleInput,
    ADDRESS_NOT_FOUND,
};
use vehicles::pricing::PricingService;

/// Address client that answers with a fixed street, fails, or stalls
struct FakeLocations {
    fail: bool,
    delay: Option<Duration>,
}

impl FakeLocations {
    fn working() -> Self {
        Self {
            fail: false,
            delay: None,
        }
    }

    fn broken() -> Self {
        Self {
            fail: true,
            delay: None,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            fail: false,
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl LocationClient for FakeLocations {
    fn name(&self) -> &str {
        "fake-maps"
    }

    async fn lookup(&self, coordinates: Coordinates) -> Result<Address, LocationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(LocationError::Malformed("maps offline".to_string()));
        }

        let mut address = Address::new(format!("{} Main St", coordinates.lat as i64));
        address.city = Some("Springfield".to_string());
        Ok(address)
    }
}

/// Price client with per-id failures and delays
#[derive(Default)]
struct ScriptedPrices {
    failures: HashMap<VehicleId, Duration>,
    delay: Option<Duration>,
}

#[async_trait]
impl PriceClient for ScriptedPrices {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn get_price(&self, vehicle_id: VehicleId) -> Result<String, PriceError> {
        if let Some(wait) = self.failures.get(&vehicle_id) {
            tokio::time::sleep(*wait).await;
            return Err(PriceError::NotFound(vehicle_id));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("USD {}.00", vehicle_id.0 * 1000))
    }
}

fn toyota(lat: f64) -> VehicleInput {
    VehicleInput::new(
        Details::for_manufacturer(Manufacturer::new(101, "Toyota")).with_model("Corolla"),
        Condition::Used,
        Coordinates::new(lat, -73.99),
    )
}

fn service(
    store: Arc<MemoryVehicleStore>,
    prices: Arc<dyn PriceClient>,
    locations: Arc<dyn LocationClient>,
    settings: EnrichmentSettings,
) -> VehicleService {
    VehicleService::new(store, prices, locations, settings)
}

fn local_service(pricing: Arc<PricingService>) -> (Arc<MemoryVehicleStore>, VehicleService) {
    let store = Arc::new(MemoryVehicleStore::new());
    let service = service(
        store.clone(),
        pricing,
        Arc::new(FakeLocations::working()),
        EnrichmentSettings::default(),
    );
    (store, service)
}

#[tokio::test]
async fn test_create_toyota_is_enriched() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let vehicle = service.save(toyota(40.0)).await.unwrap();

    assert_eq!(vehicle.id, VehicleId(1));
    assert!(vehicle.price.starts_with("USD "));
    assert_eq!(vehicle.location.address, "40 Main St");
    assert_eq!(vehicle.location.city.as_deref(), Some("Springfield"));
    assert!(vehicle.created_at <= Utc::now());
    assert!(vehicle.modified_at.is_none());
}

#[tokio::test]
async fn test_free_form_details_survive_round_trip() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let input = VehicleInput::new(
        Details::default().with_extra("make", "Toyota"),
        Condition::New,
        Coordinates::new(40.0, -73.99),
    );
    let created = service.save(input).await.unwrap();
    assert_eq!(created.details.extra["make"], "Toyota");

    let fetched = service.find_by_id(created.id).await.unwrap();
    assert_eq!(fetched.details, created.details);
    assert_eq!(fetched.details.extra["make"], "Toyota");
}

#[tokio::test]
async fn test_create_then_fetch_keeps_durable_fields() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let created = service.save(toyota(40.0)).await.unwrap();
    let fetched = service.find_by_id(created.id).await.unwrap();

    assert_eq!(fetched.details, created.details);
    assert_eq!(fetched.condition, created.condition);
    assert_eq!(fetched.coordinates(), created.coordinates());
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn test_price_is_fetched_fresh_on_every_read() {
    let pricing = Arc::new(PricingService::new());
    pricing.set_price(Price::new("USD", 100.0, VehicleId(1))).await;
    let (_, service) = local_service(pricing.clone());

    let created = service.save(toyota(40.0)).await.unwrap();
    assert_eq!(created.price, "USD 100.00");

    pricing.set_price(Price::new("USD", 250.0, VehicleId(1))).await;
    let fetched = service.find_by_id(created.id).await.unwrap();
    assert_eq!(fetched.price, "USD 250.00");

    let listed = service.list().await.unwrap();
    assert_eq!(listed[0].price, "USD 250.00");
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let err = service.find_by_id(VehicleId(42)).await.unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .save(toyota(40.0).with_id(VehicleId(42)))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = service.delete(VehicleId(42)).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let (store, service) = local_service(Arc::new(PricingService::seeded(19)));

    let created = service.save(toyota(40.0)).await.unwrap();
    service.delete(created.id).await.unwrap();
    assert!(store.is_empty().await);

    let err = service.delete(created.id).await.unwrap_err();
    assert!(matches!(err, VehicleError::NotFound(id) if id == created.id));
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let first = service.save(toyota(40.0)).await.unwrap();
    service.delete(first.id).await.unwrap();

    let second = service.save(toyota(41.0)).await.unwrap();
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_address_failure_degrades_to_placeholder() {
    let store = Arc::new(MemoryVehicleStore::new());
    let service = service(
        store,
        Arc::new(PricingService::seeded(19)),
        Arc::new(FakeLocations::broken()),
        EnrichmentSettings::default(),
    );

    let vehicle = service.save(toyota(40.0)).await.unwrap();

    assert_eq!(vehicle.location.address, ADDRESS_NOT_FOUND);
    assert!(vehicle.location.is_unresolved());
    assert_eq!(vehicle.coordinates(), Coordinates::new(40.0, -73.99));
    assert!(vehicle.price.starts_with("USD "));

    let fetched = service.find_by_id(vehicle.id).await.unwrap();
    assert_eq!(fetched.location.address, ADDRESS_NOT_FOUND);
    assert!(fetched.price.starts_with("USD "));

    let listed = service.list().await.unwrap();
    assert!(listed[0].location.is_unresolved());
}

#[tokio::test]
async fn test_price_failure_does_not_wait_for_address() {
    let store = Arc::new(MemoryVehicleStore::new());
    let service = service(
        store,
        Arc::new(PricingService::new()),
        Arc::new(FakeLocations::slow(Duration::from_secs(2))),
        EnrichmentSettings::default(),
    );

    let started = Instant::now();
    let err = service.save(toyota(40.0)).await.unwrap_err();

    assert!(matches!(err, VehicleError::PriceUnavailable { .. }));
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "price failure took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_slow_address_times_out_to_placeholder() {
    let store = Arc::new(MemoryVehicleStore::new());
    let settings = EnrichmentSettings {
        location_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let service = service(
        store,
        Arc::new(PricingService::seeded(19)),
        Arc::new(FakeLocations::slow(Duration::from_secs(5))),
        settings,
    );

    let vehicle = service.save(toyota(40.0)).await.unwrap();
    assert_eq!(vehicle.location.address, ADDRESS_NOT_FOUND);
}

#[tokio::test]
async fn test_price_failure_fails_read() {
    let pricing = Arc::new(PricingService::seeded(19));
    let (_, service) = local_service(pricing.clone());

    let created = service.save(toyota(40.0)).await.unwrap();
    pricing.remove_price(created.id).await;

    let err = service.find_by_id(created.id).await.unwrap_err();
    match err {
        VehicleError::PriceUnavailable { id, source } => {
            assert_eq!(id, created.id);
            assert!(matches!(source, PriceError::NotFound(_)));
        }
        other => panic!("expected PriceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_write_is_kept_when_price_fails() {
    let (store, service) = local_service(Arc::new(PricingService::new()));

    let err = service.save(toyota(40.0)).await.unwrap_err();
    assert!(matches!(err, VehicleError::PriceUnavailable { .. }));

    // Persisted even though the response failed
    assert_eq!(store.len().await, 1);
    assert!(store.find_by_id(VehicleId(1)).await.is_ok());
}

#[tokio::test]
async fn test_slow_price_is_unavailable() {
    let store = Arc::new(MemoryVehicleStore::new());
    let settings = EnrichmentSettings {
        price_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let prices = ScriptedPrices {
        delay: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    let service = service(
        store,
        Arc::new(prices),
        Arc::new(FakeLocations::working()),
        settings,
    );

    let err = service.save(toyota(40.0)).await.unwrap_err();
    match err {
        VehicleError::PriceUnavailable { source, .. } => {
            assert!(matches!(source, PriceError::Timeout(_)));
        }
        other => panic!("expected PriceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_fails_when_any_price_fails() {
    let pricing = Arc::new(PricingService::seeded(19));
    let (_, service) = local_service(pricing.clone());

    for lat in [40.0, 41.0, 42.0] {
        service.save(toyota(lat)).await.unwrap();
    }
    assert_eq!(service.list().await.unwrap().len(), 3);

    pricing.remove_price(VehicleId(2)).await;
    let err = service.list().await.unwrap_err();
    assert!(matches!(err, VehicleError::PriceUnavailable { id, .. } if id == VehicleId(2)));
}

#[tokio::test]
async fn test_list_of_empty_store() {
    let (_, service) = local_service(Arc::new(PricingService::new()));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_list_keeps_store_order() {
    let store = Arc::new(MemoryVehicleStore::new());
    let settings = EnrichmentSettings {
        list_concurrency: 4,
        ..Default::default()
    };
    let service = service(
        store,
        Arc::new(ScriptedPrices::default()),
        Arc::new(FakeLocations::working()),
        settings,
    );

    for lat in [10.0, 20.0, 30.0, 40.0, 50.0] {
        service.save(toyota(lat)).await.unwrap();
    }

    let listed = service.list().await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|v| v.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(listed[2].price, "USD 3000.00");
    assert_eq!(listed[4].location.address, "50 Main St");
}

#[tokio::test]
async fn test_concurrent_list_reports_earliest_failure() {
    let store = Arc::new(MemoryVehicleStore::new());
    for lat in [10.0, 20.0, 30.0] {
        let draft = vehicles::domain::VehicleDraft::new(
            Details::default(),
            Condition::New,
            Coordinates::new(lat, 0.0),
        );
        store.save(draft).await.unwrap();
    }

    // Record 3 fails at once, record 2 fails later; record 2 comes first
    let mut failures = HashMap::new();
    failures.insert(VehicleId(2), Duration::from_millis(100));
    failures.insert(VehicleId(3), Duration::ZERO);
    let prices = ScriptedPrices {
        failures,
        ..Default::default()
    };

    let settings = EnrichmentSettings {
        list_concurrency: 3,
        ..Default::default()
    };
    let service = service(
        store,
        Arc::new(prices),
        Arc::new(FakeLocations::working()),
        settings,
    );

    let err = service.list().await.unwrap_err();
    assert!(matches!(err, VehicleError::PriceUnavailable { id, .. } if id == VehicleId(2)));
}

#[tokio::test]
async fn test_update_preserves_created_at_by_default() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let created = service.save(toyota(40.0)).await.unwrap();
    let requested = Utc::now() - ChronoDuration::days(365);

    let input = toyota(40.0)
        .with_id(created.id)
        .with_created_at(requested);
    let updated = service.save(input).await.unwrap();

    assert_eq!(updated.created_at, created.created_at);
    let modified_at = updated.modified_at.unwrap();
    assert!(updated.created_at <= modified_at);
}

#[tokio::test]
async fn test_update_takes_created_at_from_request_when_configured() {
    let store = Arc::new(MemoryVehicleStore::new());
    let settings = EnrichmentSettings {
        created_at_on_update: CreatedAtPolicy::FromRequest,
        ..Default::default()
    };
    let service = service(
        store,
        Arc::new(PricingService::seeded(19)),
        Arc::new(FakeLocations::working()),
        settings,
    );

    let created = service.save(toyota(40.0)).await.unwrap();
    let requested = Utc::now() - ChronoDuration::days(365);

    let updated = service
        .save(toyota(40.0).with_id(created.id).with_created_at(requested))
        .await
        .unwrap();
    assert_eq!(updated.created_at, requested);

    let refetched = service.find_by_id(created.id).await.unwrap();
    assert_eq!(refetched.created_at, requested);
}

#[tokio::test]
async fn test_update_merges_details_and_condition_only() {
    let (_, service) = local_service(Arc::new(PricingService::seeded(19)));

    let created = service.save(toyota(40.0)).await.unwrap();

    let mut input = VehicleInput::new(
        Details::for_manufacturer(Manufacturer::new(102, "Honda"))
            .with_model("Civic")
            .with_mileage(12_000),
        Condition::New,
        Coordinates::new(-33.86, 151.2),
    );
    input.id = Some(created.id);
    let updated = service.save(input).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.details.model.as_deref(), Some("Civic"));
    assert_eq!(updated.details.mileage, Some(12_000));
    assert_eq!(updated.condition, Condition::New);
    assert_eq!(updated.coordinates(), created.coordinates());
    assert!(updated.modified_at.is_some());
}
