//! Internal notification endpoints.

use axum::{extract::State, http::StatusCode, Json};
use floorlink_core::protocol::TaskMutation;
use tracing::info;

use crate::state::AppState;

/// Receive a task mutation from the CRUD service and fan it out to every
/// WebSocket client.
pub async fn notify(State(state): State<AppState>, Json(mutation): Json<TaskMutation>) -> StatusCode {
    let kind = mutation.kind;
    let recipients = state.hub.notify(mutation);
    info!(kind = %kind, recipients, "Received internal notification");
    StatusCode::ACCEPTED
}
