//! Floorlink Web Server
//!
//! Axum-based realtime server: presence roster and task mutation relay over
//! WebSocket, plus a small REST surface.

pub mod auth;
pub mod hub;
pub mod routes;
pub mod state;
pub mod websocket;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use floorlink_core::config::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Build the CORS layer for `origin` (`*` allows any).
fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(cors.allow_origin(Any));
    }
    let value = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS origin: {:?}", origin))?;
    Ok(cors.allow_origin(value))
}

/// Create the application router.
///
/// `/api` and `/internal` sit behind [`auth::require_token`]; `/ws` checks its
/// own query token and `/health` stays open.
pub fn create_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let guarded = Router::new()
        .route("/api/presence", get(routes::presence::list_presence))
        .route("/internal/notify", post(routes::internal::notify))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Ok(Router::new()
        .merge(guarded)
        .route("/ws", get(websocket::ws_handler))
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin)?)
        .with_state(state))
}

/// Run the web server until Ctrl+C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::new(config);
    if state.jwt_secret.is_none() {
        tracing::warn!("No JWT secret configured, trusting client-announced identities");
    }
    let hub = state.hub.clone();
    let app = create_router(state, &config.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("Realtime server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    hub.dispose();
    Ok(())
}
