//! Liveness and reservation-listing handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{Value, json};

use crate::core::reservations::ReservationRecord;
use crate::state::AppState;

/// `GET /` liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct ReservationsResponse {
    pub reservations: Vec<ReservationRecord>,
}

/// `GET /reservations` — every confirmed reservation, completion order.
pub async fn list_reservations(State(state): State<Arc<AppState>>) -> Json<ReservationsResponse> {
    Json(ReservationsResponse {
        reservations: state.reservations.snapshot(),
    })
}
