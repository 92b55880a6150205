pub mod config;
pub mod core;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use crate::config::{ExtractorMode, ServerConfig};
pub use crate::core::dialogue;
pub use crate::core::extract::{ExtractError, ExtractOutcome, ExtractResult, FieldExtractor};
pub use crate::core::reservations::{ReservationLog, ReservationRecord};
pub use crate::core::session::{CallSession, ReservationFields, SessionError, SessionStore};
pub use crate::state::AppState;
