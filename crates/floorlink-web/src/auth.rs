//! Bearer-token guard for the HTTP routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use floorlink_core::identity;
use tracing::warn;

use crate::state::AppState;

/// Require `Authorization: Bearer <jwt>` when a JWT secret is configured.
///
/// Without a secret every request passes, matching the trusted `/ws` mode.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(secret) = state.jwt_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if let Err(e) = identity::verify_token(secret, token) {
        warn!(path = %request.uri().path(), error = %e, "Rejected HTTP request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
