use std::sync::Arc;

use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::voice;
use crate::state::AppState;

/// Create the telephony webhook router
///
/// No auth: webhook caller authentication is out of scope; these paths must
/// match what the telephony provider is configured to call.
pub fn create_voice_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/incoming-call", post(voice::incoming_call))
        .route("/process-speech", post(voice::process_speech))
        .layer(TraceLayer::new_for_http())
}
