//! WebSocket wire protocol.
//!
//! Frames are JSON text, adjacently tagged as `{"type": ..., "data": ...}`.
//! Task payloads are carried as raw JSON and never re-serialized, so a relayed
//! payload reaches receivers exactly as the sender wrote it.
//!
//! Decoding goes through [`RawFrame`] rather than a derived enum: serde buffers
//! adjacently tagged content, and buffered content cannot hold a `RawValue`.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

use crate::error::{FloorError, FloorResult};
use crate::presence::{Identity, PresenceRecord};

/// What happened to the task a mutation refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Created,
    #[default]
    Updated,
    Deleted,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for MutationKind {
    type Err = FloorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" | "create" => Ok(Self::Created),
            "updated" | "update" => Ok(Self::Updated),
            "deleted" | "delete" => Ok(Self::Deleted),
            other => Err(FloorError::InvalidMutationKind(other.to_string())),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "A task changed" signal. The payload is opaque to this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMutation {
    #[serde(default)]
    pub kind: MutationKind,
    pub payload: Box<RawValue>,
}

impl TaskMutation {
    /// Build a mutation from a JSON document, keeping its text as-is.
    pub fn from_json_str(kind: MutationKind, payload: &str) -> FloorResult<Self> {
        Ok(Self {
            kind,
            payload: RawValue::from_string(payload.to_string())?,
        })
    }

    /// Payload text exactly as received.
    pub fn payload_str(&self) -> &str {
        self.payload.get()
    }
}

/// Client → server events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    Announce(Identity),
    TaskMutation(TaskMutation),
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    PresenceRoster { records: Vec<PresenceRecord> },
    TaskMutated(TaskMutation),
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    event: String,
    data: Option<Box<RawValue>>,
}

impl RawFrame {
    fn parse(text: &str) -> FloorResult<Self> {
        serde_json::from_str(text).map_err(|e| FloorError::malformed(e.to_string()))
    }

    fn data(&self) -> FloorResult<&str> {
        self.data
            .as_deref()
            .map(RawValue::get)
            .ok_or_else(|| FloorError::malformed(format!("'{}' frame has no data", self.event)))
    }

    fn payload(&self) -> FloorResult<Box<RawValue>> {
        Ok(RawValue::from_string(self.data()?.to_string())?)
    }
}

impl ClientEvent {
    /// Decode a text frame sent by a client.
    ///
    /// Besides `announce` and `taskMutation`, the event names of the first
    /// dashboard release are understood: `userConnected`, and
    /// `taskCreate`/`taskUpdate`/`taskDelete` whose data is the bare payload.
    pub fn decode(text: &str) -> FloorResult<Self> {
        let frame = RawFrame::parse(text)?;
        match frame.event.as_str() {
            "announce" | "userConnected" => Ok(Self::Announce(serde_json::from_str(frame.data()?)?)),
            "taskMutation" => Ok(Self::TaskMutation(serde_json::from_str(frame.data()?)?)),
            "taskCreate" => Self::legacy(MutationKind::Created, &frame),
            "taskUpdate" => Self::legacy(MutationKind::Updated, &frame),
            "taskDelete" => Self::legacy(MutationKind::Deleted, &frame),
            other => Err(FloorError::UnknownEvent(other.to_string())),
        }
    }

    fn legacy(kind: MutationKind, frame: &RawFrame) -> FloorResult<Self> {
        Ok(Self::TaskMutation(TaskMutation {
            kind,
            payload: frame.payload()?,
        }))
    }

    pub fn encode(&self) -> FloorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    /// Decode a text frame sent by the server.
    pub fn decode(text: &str) -> FloorResult<Self> {
        let frame = RawFrame::parse(text)?;
        match frame.event.as_str() {
            "presenceRoster" => {
                #[derive(Deserialize)]
                struct Roster {
                    records: Vec<PresenceRecord>,
                }
                let roster: Roster = serde_json::from_str(frame.data()?)?;
                Ok(Self::PresenceRoster {
                    records: roster.records,
                })
            }
            "taskMutated" => Ok(Self::TaskMutated(serde_json::from_str(frame.data()?)?)),
            other => Err(FloorError::UnknownEvent(other.to_string())),
        }
    }

    pub fn encode(&self) -> FloorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Event name as it appears in the `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PresenceRoster { .. } => "presenceRoster",
            Self::TaskMutated(_) => "taskMutated",
        }
    }
}
