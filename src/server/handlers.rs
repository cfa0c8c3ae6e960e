//! Vehicle record handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::json_error;
use crate::core::{VehicleError, VehicleService};
use crate::domain::{VehicleId, VehicleInput};

/// Map a failed operation to a status code
fn error_response(err: VehicleError) -> Response {
    match err {
        VehicleError::NotFound(_) => json_error(StatusCode::NOT_FOUND, &err.to_string()),
        VehicleError::PriceUnavailable { .. } | VehicleError::Store(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Body that failed to parse as a vehicle
fn rejection_response(rejection: JsonRejection) -> Response {
    json_error(rejection.status(), &rejection.body_text())
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// GET /cars
pub(crate) async fn handle_list(State(service): State<Arc<VehicleService>>) -> Response {
    match service.list().await {
        Ok(vehicles) => (StatusCode::OK, Json(vehicles)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /cars/{id}
pub(crate) async fn handle_get(
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<VehicleId>,
) -> Response {
    match service.find_by_id(id).await {
        Ok(vehicle) => (StatusCode::OK, Json(vehicle)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /cars
///
/// 201 for a create, 200 when the body carried an id (update).
pub(crate) async fn handle_create(
    State(service): State<Arc<VehicleService>>,
    body: Result<Json<VehicleInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    let status = if input.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    match service.save(input).await {
        Ok(vehicle) => (status, Json(vehicle)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /cars/{id}
pub(crate) async fn handle_update(
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<VehicleId>,
    body: Result<Json<VehicleInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.save(input.with_id(id)).await {
        Ok(vehicle) => (StatusCode::OK, Json(vehicle)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /cars/{id}
pub(crate) async fn handle_delete(
    State(service): State<Arc<VehicleService>>,
    Path(id): Path<VehicleId>,
) -> Response {
    match service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
