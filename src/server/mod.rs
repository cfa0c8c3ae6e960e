//! HTTP JSON APIs, built on `axum` + `tokio`.
//!
//! Two independent routers:
//!
//! Record API (`vehicles_router`):
//! - GET    /health        - Server status
//! - GET    /cars          - All vehicles, enriched
//! - GET    /cars/{id}     - One vehicle, enriched
//! - POST   /cars          - Create (no id) or update (id in body)
//! - PUT    /cars/{id}     - Update
//! - DELETE /cars/{id}     - Delete
//!
//! Pricing API (`pricing_router`):
//! - GET    /health
//! - GET    /prices                          - All price quotes
//! - GET    /price/{id}                      - One quote, 404 if none
//! - GET    /services/price?vehicle_id={id}  - Same, query-string form
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod pricing;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::core::VehicleService;
use crate::pricing::PricingService;

use self::handlers::{
    handle_create, handle_delete, handle_get, handle_health, handle_list, handle_not_found,
    handle_update,
};
use self::pricing::{handle_get_price, handle_list_prices, handle_price_query};

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Routes for the vehicle record API
pub fn vehicles_router(service: Arc<VehicleService>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/cars", get(handle_list).post(handle_create))
        .route(
            "/cars/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .fallback(handle_not_found)
        .with_state(service)
}

/// Routes for the pricing service
pub fn pricing_router(pricing: Arc<PricingService>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/prices", get(handle_list_prices))
        .route("/price/{id}", get(handle_get_price))
        .route("/services/price", get(handle_price_query))
        .fallback(handle_not_found)
        .with_state(pricing)
}

/// Serve a router on `address` until Ctrl+C
pub async fn serve(router: Router, address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    let local = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!(address = %local, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
