//! Frame evaluation
//!
//! Turns a raw `FrameInput` into a `Frame` ready for persistence. This is a
//! structural check only: angles arrive already computed by the capture
//! client, and no smoothing or filtering happens here.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Frame, FrameInput};

/// Validate an incoming frame against the session's prior frames.
///
/// Rejects a missing angle map, an empty stage and a negative rep count.
/// A rep count lower than the previous frame's is accepted (the client is
/// the authority on reps) but logged.
pub fn evaluate_frame(
    session_id: Uuid,
    prior: &[Frame],
    input: &FrameInput,
    received_at: DateTime<Utc>,
) -> CoreResult<Frame> {
    let angles = input
        .angles
        .as_ref()
        .ok_or_else(|| CoreError::Validation("angles must be present".to_string()))?;

    if input.stage.trim().is_empty() {
        return Err(CoreError::Validation("stage must not be empty".to_string()));
    }

    if input.rep_count < 0 {
        return Err(CoreError::Validation(format!(
            "rep_count must be non-negative, got {}",
            input.rep_count
        )));
    }
    let rep_count = u32::try_from(input.rep_count).map_err(|_| {
        CoreError::Validation(format!(
            "rep_count {} is out of range (max {})",
            input.rep_count,
            u32::MAX
        ))
    })?;

    if let Some(last) = prior.last() {
        if rep_count < last.rep_count {
            warn!(
                session_id = %session_id,
                previous = last.rep_count,
                current = rep_count,
                "Rep count decreased between frames"
            );
        }
    }

    Ok(Frame {
        session_id,
        angles: angles.clone(),
        stage: input.stage.clone(),
        rep_count,
        timestamp: input.timestamp,
        side: input.side,
        created_at: received_at,
    })
}
