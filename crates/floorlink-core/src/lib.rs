//! Floorlink Core Library
//!
//! Presence model, connection registry and wire protocol for the warehouse
//! task board's realtime layer.

pub mod config;
pub mod error;
pub mod identity;
pub mod notifier;
pub mod presence;
pub mod protocol;
pub mod roster;

pub use error::{FloorError, FloorResult};
