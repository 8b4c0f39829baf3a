//! Presence route handlers.

use axum::{extract::State, Json};
use floorlink_core::presence::PresenceRecord;

use crate::state::AppState;

/// GET /api/presence: current roster.
pub async fn list_presence(State(state): State<AppState>) -> Json<Vec<PresenceRecord>> {
    Json(state.hub.roster())
}
