//! Client-side view of who is online.

use crate::presence::PresenceRecord;
use crate::protocol::ServerEvent;

/// Local copy of the last roster a client received.
///
/// Empty until the first `presenceRoster` arrives; every later roster
/// replaces the view wholesale.
#[derive(Debug, Default, Clone)]
pub struct RosterView {
    records: Option<Vec<PresenceRecord>>,
}

impl RosterView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a server event. Returns `true` when the view changed.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::PresenceRoster { records } => {
                self.records = Some(records.clone());
                true
            }
            ServerEvent::TaskMutated(_) => false,
        }
    }

    /// Whether a roster has been received yet.
    pub fn is_ready(&self) -> bool {
        self.records.is_some()
    }

    /// Records of the last roster, if any.
    pub fn records(&self) -> Option<&[PresenceRecord]> {
        self.records.as_deref()
    }

    /// Number of open connections in the last roster.
    pub fn online_count(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }

    /// One record per user, first connection wins.
    pub fn distinct_users(&self) -> Vec<&PresenceRecord> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .flatten()
            .filter(|&r| seen.insert(r.user_id.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::{ConnectionId, Role};
    use crate::protocol::{MutationKind, TaskMutation};
    use chrono::Utc;

    fn record(user: &str) -> PresenceRecord {
        PresenceRecord {
            connection_id: ConnectionId::new(),
            user_id: user.to_string(),
            username: user.to_uppercase(),
            role: Role::Office,
            connected_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_until_first_roster() {
        let mut view = RosterView::new();
        assert!(!view.is_ready());
        assert!(view.records().is_none());
        assert_eq!(view.online_count(), 0);

        let mutation = TaskMutation::from_json_str(MutationKind::Updated, "{}").unwrap();
        assert!(!view.apply(&ServerEvent::TaskMutated(mutation)));
        assert!(!view.is_ready());

        assert!(view.apply(&ServerEvent::PresenceRoster { records: vec![] }));
        assert!(view.is_ready());
        assert_eq!(view.records().unwrap().len(), 0);
    }

    #[test]
    fn test_roster_replaces_wholesale() {
        let mut view = RosterView::new();
        view.apply(&ServerEvent::PresenceRoster {
            records: vec![record("a"), record("b")],
        });
        assert_eq!(view.online_count(), 2);

        let only_c = record("c");
        view.apply(&ServerEvent::PresenceRoster {
            records: vec![only_c.clone()],
        });
        assert_eq!(view.records().unwrap(), &[only_c][..]);
    }

    #[test]
    fn test_distinct_users() {
        let mut view = RosterView::new();
        view.apply(&ServerEvent::PresenceRoster {
            records: vec![record("a"), record("b"), record("a")],
        });
        let users: Vec<&str> = view.distinct_users().iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["a", "b"]);
        assert_eq!(view.online_count(), 3);
    }
}
