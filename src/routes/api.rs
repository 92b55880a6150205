use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;

/// Create the read-side API router (reservation listing).
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(api::list_reservations))
        .layer(TraceLayer::new_for_http())
}
