//! Presence hub: roster broadcaster and task event relay.
//!
//! The hub owns the connection registry together with one outbound channel per
//! live connection. Every operation mutates and fans out under a single lock,
//! so each roster a client receives equals the registry right after the change
//! that produced it, and all clients see rosters in the same order. Sends are
//! non-blocking; the lock is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use floorlink_core::presence::{ConnectionId, ConnectionRegistry, Identity, PresenceRecord};
use floorlink_core::protocol::{ServerEvent, TaskMutation};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Event queued for a connection's writer task.
pub type Outbound = Arc<ServerEvent>;

/// Sending half of a connection's outbound queue.
pub type ConnectionSender = mpsc::UnboundedSender<Outbound>;

#[derive(Default)]
struct HubInner {
    registry: ConnectionRegistry,
    connections: HashMap<ConnectionId, ConnectionSender>,
}

impl HubInner {
    /// Queue `event` for every live connection except `skip`.
    fn fan_out(&self, event: Outbound, skip: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        for (id, sender) in &self.connections {
            if Some(*id) == skip {
                continue;
            }
            // A closed receiver means the connection is going away; its
            // disconnect will follow.
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn broadcast_roster(&self) -> usize {
        let event = Arc::new(ServerEvent::PresenceRoster {
            records: self.registry.snapshot(),
        });
        let delivered = self.fan_out(event, None);
        debug!(
            online = self.registry.len(),
            recipients = delivered,
            "Broadcast presence roster"
        );
        delivered
    }
}

/// Single owner of realtime presence state.
#[derive(Default)]
pub struct PresenceHub {
    inner: Mutex<HubInner>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        // Nothing in the critical sections can leave the state half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a new connection's outbound queue. No roster entry yet.
    pub fn connect(&self, connection_id: ConnectionId, sender: ConnectionSender) {
        let mut inner = self.lock();
        inner.connections.insert(connection_id, sender);
        debug!(
            connection_id = %connection_id,
            connections = inner.connections.len(),
            "Connection attached"
        );
    }

    /// Register the connection's identity and broadcast the roster.
    /// Returns the number of connections the roster was queued for.
    pub fn announce(&self, connection_id: ConnectionId, identity: Identity) -> usize {
        let mut inner = self.lock();
        info!(
            connection_id = %connection_id,
            user_id = %identity.user_id,
            username = %identity.username,
            role = %identity.role,
            "User announced"
        );
        inner.registry.register(connection_id, identity);
        inner.broadcast_roster()
    }

    /// Detach the connection, drop its roster entry and broadcast the roster.
    pub fn disconnect(&self, connection_id: ConnectionId) -> Option<PresenceRecord> {
        let mut inner = self.lock();
        inner.connections.remove(&connection_id);
        let removed = inner.registry.unregister(connection_id);
        if let Some(record) = &removed {
            info!(
                connection_id = %connection_id,
                user_id = %record.user_id,
                "User went offline"
            );
        }
        inner.broadcast_roster();
        removed
    }

    /// Forward a client's task mutation to every other live connection.
    pub fn relay(&self, source: ConnectionId, mutation: TaskMutation) -> usize {
        let inner = self.lock();
        let kind = mutation.kind;
        let delivered = inner.fan_out(Arc::new(ServerEvent::TaskMutated(mutation)), Some(source));
        debug!(source = %source, kind = %kind, recipients = delivered, "Relayed task mutation");
        delivered
    }

    /// Fan a server-originated task mutation out to every live connection.
    pub fn notify(&self, mutation: TaskMutation) -> usize {
        let inner = self.lock();
        let kind = mutation.kind;
        let delivered = inner.fan_out(Arc::new(ServerEvent::TaskMutated(mutation)), None);
        debug!(kind = %kind, recipients = delivered, "Fanned out task notification");
        delivered
    }

    /// Copy of the current roster.
    pub fn roster(&self) -> Vec<PresenceRecord> {
        self.lock().registry.snapshot()
    }

    /// Live connections, announced or not.
    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Announced connections.
    pub fn online_count(&self) -> usize {
        self.lock().registry.len()
    }

    /// Drop every outbound queue and clear the roster.
    ///
    /// Writer tasks see their queue close and end, which closes the sockets.
    /// Returns how many connections were dropped.
    pub fn dispose(&self) -> usize {
        let mut inner = self.lock();
        let dropped = inner.connections.len();
        inner.connections.clear();
        inner.registry.clear();
        info!(dropped, "Presence hub disposed");
        dropped
    }
}
