//! Connection registry.
//!
//! Maps each live connection to the presence record it announced. The
//! registry is a plain owned value; whoever holds it is the only writer.

use chrono::Utc;
use tracing::debug;

use super::model::{ConnectionId, Identity, PresenceRecord};

/// In-memory roster keyed by connection id, kept in insertion order.
///
/// Backed by a `Vec` because the number of concurrent staff connections is
/// small; lookups are linear.
#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    entries: Vec<PresenceRecord>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `connection_id`.
    ///
    /// Overwriting keeps the entry's position and stamps a fresh
    /// `connected_at`. Duplicate user ids across connections are accepted.
    pub fn register(&mut self, connection_id: ConnectionId, identity: Identity) {
        let record = PresenceRecord {
            connection_id,
            user_id: identity.user_id,
            username: identity.username,
            role: identity.role,
            connected_at: Utc::now(),
        };

        match self.position(connection_id) {
            Some(idx) => {
                debug!(connection_id = %connection_id, "Overwriting presence record");
                self.entries[idx] = record;
            }
            None => {
                debug!(connection_id = %connection_id, user_id = %record.user_id, "Registering presence record");
                self.entries.push(record);
            }
        }
    }

    /// Remove the record for `connection_id`. Absent ids are a no-op.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Option<PresenceRecord> {
        let idx = self.position(connection_id)?;
        debug!(connection_id = %connection_id, "Unregistering presence record");
        Some(self.entries.remove(idx))
    }

    /// Copy of the current roster.
    pub fn snapshot(&self) -> Vec<PresenceRecord> {
        self.entries.clone()
    }

    pub fn get(&self, connection_id: ConnectionId) -> Option<&PresenceRecord> {
        self.entries.iter().find(|r| r.connection_id == connection_id)
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.position(connection_id).is_some()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.entries.iter().map(|r| r.connection_id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, connection_id: ConnectionId) -> Option<usize> {
        self.entries.iter().position(|r| r.connection_id == connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::model::Role;
    use std::collections::HashSet;

    fn identity(user: &str) -> Identity {
        Identity::new(user, format!("{}-name", user), Role::Warehouse)
    }

    #[test]
    fn test_register_and_snapshot() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.register(a, identity("u1"));
        registry.register(b, identity("u2"));

        let roster = registry.snapshot();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].connection_id, a);
        assert_eq!(roster[1].connection_id, b);
        assert_eq!(roster[1].username, "u2-name");
        assert!(registry.contains(a));
        assert_eq!(registry.get(b).unwrap().user_id, "u2");
        assert!(registry.get(ConnectionId::new()).is_none());
    }

    #[test]
    fn test_register_overwrites_same_connection() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.register(a, identity("u1"));
        registry.register(b, identity("u2"));
        registry.register(a, Identity::new("u9", "renamed", Role::Monitor));

        assert_eq!(registry.len(), 2);
        let roster = registry.snapshot();
        assert_eq!(roster[0].connection_id, a);
        assert_eq!(roster[0].user_id, "u9");
        assert_eq!(roster[0].username, "renamed");
        assert_eq!(roster[0].role, Role::Monitor);
    }

    #[test]
    fn test_same_user_on_two_connections() {
        let mut registry = ConnectionRegistry::new();
        registry.register(ConnectionId::new(), identity("u1"));
        registry.register(ConnectionId::new(), identity("u1"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        registry.register(a, identity("u1"));

        assert!(registry.unregister(ConnectionId::new()).is_none());
        assert_eq!(registry.len(), 1);

        let removed = registry.unregister(a).unwrap();
        assert_eq!(removed.user_id, "u1");
        assert!(registry.unregister(a).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        registry.register(a, identity("u1"));
        let before = registry.snapshot();
        registry.unregister(a);
        assert_eq!(before.len(), 1);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_random_sequences_match_model() {
        let ids: Vec<ConnectionId> = (0..8).map(|_| ConnectionId::new()).collect();
        let mut registry = ConnectionRegistry::new();
        let mut live: HashSet<ConnectionId> = HashSet::new();

        // Small LCG so the sequence is deterministic.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let id = ids[((seed >> 33) % ids.len() as u64) as usize];
            if (seed >> 17) & 1 == 0 {
                registry.register(id, identity("u"));
                live.insert(id);
            } else {
                registry.unregister(id);
                live.remove(&id);
            }

            let snapshot: Vec<ConnectionId> = registry.connection_ids();
            let unique: HashSet<ConnectionId> = snapshot.iter().copied().collect();
            assert_eq!(snapshot.len(), unique.len());
            assert_eq!(unique, live);
        }
    }
}
