//! Frame types: FrameInput (wire payload), Frame (validated record), BodySide

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Which side of the body a frame was captured for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
    Both,
}

/// Raw frame payload as submitted by the capture client.
///
/// Fields are deliberately loose (`Option` angles, signed rep count) so the
/// evaluator can reject malformed input with a validation error instead of
/// a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameInput {
    /// Joint name -> angle in degrees
    #[serde(default)]
    pub angles: Option<BTreeMap<String, f64>>,
    /// Movement stage label, e.g. "up" / "down"
    #[serde(default)]
    pub stage: String,
    /// Completed repetitions, as counted by the client
    pub rep_count: i64,
    /// Capture timestamp on the client clock (seconds)
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub side: Option<BodySide>,
}

/// A validated telemetry frame belonging to exactly one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Frame {
    pub session_id: Uuid,
    pub angles: BTreeMap<String, f64>,
    pub stage: String,
    pub rep_count: u32,
    /// Client clock; not guaranteed to be ordered across frames
    pub timestamp: f64,
    #[serde(default)]
    pub side: Option<BodySide>,
    /// Server arrival time
    pub created_at: DateTime<Utc>,
}
