//! Presence domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::FloorError;

/// Identifier the transport assigns to a single live connection.
///
/// Random v4 UUIDs, so an id is never handed out twice within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Staff role.
///
/// Older clients send the Italian tags, which decode to the same variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[serde(alias = "ufficio")]
    Office,
    #[serde(alias = "magazzino")]
    Warehouse,
    Monitor,
}

impl Role {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Office => "office",
            Self::Warehouse => "warehouse",
            Self::Monitor => "monitor",
        }
    }
}

impl FromStr for Role {
    type Err = FloorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "office" | "ufficio" => Ok(Self::Office),
            "warehouse" | "magazzino" => Ok(Self::Warehouse),
            "monitor" => Ok(Self::Monitor),
            other => Err(FloorError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is behind a connection, as announced by the client or proven by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
        }
    }
}

/// One roster entry: a live, announced connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub connection_id: ConnectionId,
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub connected_at: DateTime<Utc>,
}

impl PresenceRecord {
    /// Identity carried by this record.
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), self.username.clone(), self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_aliases() {
        let role: Role = serde_json::from_str("\"magazzino\"").unwrap();
        assert_eq!(role, Role::Warehouse);
        let role: Role = serde_json::from_str("\"ufficio\"").unwrap();
        assert_eq!(role, Role::Office);
        assert_eq!(serde_json::to_string(&Role::Office).unwrap(), "\"office\"");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Monitor".parse::<Role>().unwrap(), Role::Monitor);
        assert_eq!("magazzino".parse::<Role>().unwrap(), Role::Warehouse);
        assert!(matches!("driver".parse::<Role>(), Err(FloorError::InvalidRole(_))));
    }

    #[test]
    fn test_record_wire_shape() {
        let record = PresenceRecord {
            connection_id: ConnectionId::new(),
            user_id: "u1".to_string(),
            username: "marco".to_string(),
            role: Role::Warehouse,
            connected_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["username"], "marco");
        assert_eq!(value["role"], "warehouse");
        assert!(value.get("connectionId").is_some());
        assert!(value.get("connectedAt").is_some());
    }

    #[test]
    fn test_connection_ids_are_distinct() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
