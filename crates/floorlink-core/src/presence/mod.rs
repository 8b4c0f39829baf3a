//! Presence tracking.

pub mod model;
pub mod registry;

pub use model::{ConnectionId, Identity, PresenceRecord, Role};
pub use registry::ConnectionRegistry;
