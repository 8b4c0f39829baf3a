//! Server configuration.
//!
//! Read from an optional TOML file, then overridden by environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{FloorError, FloorResult};

/// Port the dashboard clients expect the realtime server on.
pub const DEFAULT_PORT: u16 = 5000;

/// Default host to bind to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin, or `*` for any.
    pub cors_origin: String,
    /// Shared HS256 secret. When set, `/ws` requires a token.
    pub jwt_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origin: "*".to_string(),
            jwt_secret: None,
        }
    }
}

impl Config {
    /// Load from `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> FloorResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> FloorResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Apply `FLOORLINK_HOST`, `FLOORLINK_PORT`, `FLOORLINK_CORS_ORIGIN` and
    /// `JWT_SECRET` as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> FloorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FLOORLINK_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("FLOORLINK_PORT") {
            self.port = port
                .parse()
                .map_err(|_| FloorError::config(format!("FLOORLINK_PORT is not a port: {}", port)))?;
        }
        if let Some(origin) = lookup("FLOORLINK_CORS_ORIGIN") {
            self.cors_origin = origin;
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.jwt_secret = Some(secret);
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
