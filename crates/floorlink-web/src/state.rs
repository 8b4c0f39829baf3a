//! Application state.

use floorlink_core::config::Config;
use std::sync::Arc;

use crate::hub::PresenceHub;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<PresenceHub>,
    /// When set, WebSocket connections must present a token signed with it.
    pub jwt_secret: Option<Arc<[u8]>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            hub: Arc::new(PresenceHub::new()),
            jwt_secret: config
                .jwt_secret
                .as_deref()
                .map(|s| Arc::from(s.as_bytes())),
        }
    }
}
