//! Pricing service handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::json_error;
use crate::domain::VehicleId;
use crate::pricing::PricingService;

#[derive(Debug, Deserialize)]
pub(crate) struct PriceQuery {
    #[serde(alias = "vehicleId")]
    vehicle_id: VehicleId,
}

async fn quote_response(pricing: &PricingService, id: VehicleId) -> Response {
    match pricing.quote(id).await {
        Ok(price) => (StatusCode::OK, Json(price)).into_response(),
        Err(e) => json_error(StatusCode::NOT_FOUND, &e.to_string()),
    }
}

/// GET /prices
pub(crate) async fn handle_list_prices(State(pricing): State<Arc<PricingService>>) -> Response {
    (StatusCode::OK, Json(pricing.list().await)).into_response()
}

/// GET /price/{id}
pub(crate) async fn handle_get_price(
    State(pricing): State<Arc<PricingService>>,
    Path(id): Path<VehicleId>,
) -> Response {
    quote_response(&pricing, id).await
}

/// GET /services/price?vehicle_id={id}
pub(crate) async fn handle_price_query(
    State(pricing): State<Arc<PricingService>>,
    Query(query): Query<PriceQuery>,
) -> Response {
    quote_response(&pricing, query.vehicle_id).await
}
