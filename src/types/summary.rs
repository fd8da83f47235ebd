//! Aggregate views: SessionSummary, ProgressEntry, ProgressReport, FrameAck

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ExerciseType, Feedback, FeedbackSource, Frame, FeedbackRecord, Session};

// ============================================================================
// Session Summary
// ============================================================================

/// Full read-only view of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session: Session,
    /// All frames in arrival order
    pub frames: Vec<Frame>,
    /// All feedback in arrival order
    pub feedback: Vec<FeedbackRecord>,
    /// Maximum rep count across frames (0 when no frames)
    pub total_reps: u32,
    pub total_frames: usize,
    pub feedback_count: usize,
    /// Last few feedback texts, oldest first
    pub latest_feedback: Vec<String>,
}

impl SessionSummary {
    /// Compact wire view without the raw frame and feedback lists
    pub fn overview(&self) -> SessionOverview {
        SessionOverview {
            session_id: self.session.id,
            exercise_type: self.session.exercise_type,
            total_reps: self.total_reps,
            total_frames: self.total_frames,
            feedback_count: self.feedback_count,
            latest_feedback: self.latest_feedback.clone(),
        }
    }
}

/// Summary payload returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionOverview {
    pub session_id: Uuid,
    pub exercise_type: ExerciseType,
    pub total_reps: u32,
    pub total_frames: usize,
    pub feedback_count: usize,
    pub latest_feedback: Vec<String>,
}

// ============================================================================
// Progress
// ============================================================================

/// Read-only projection of a session for longitudinal reporting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEntry {
    pub session_id: Uuid,
    pub exercise_type: ExerciseType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_reps: u32,
    pub avg_score: Option<f64>,
}

impl From<&Session> for ProgressEntry {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            exercise_type: session.exercise_type,
            start_time: session.start_time,
            end_time: session.end_time,
            total_reps: session.total_reps,
            avg_score: session.avg_score,
        }
    }
}

/// A user's sessions inside a trailing time window, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressReport {
    pub user_id: String,
    pub window_days: i64,
    /// Inclusive lower bound on `start_time`
    pub since: DateTime<Utc>,
    pub sessions: Vec<ProgressEntry>,
}

impl ProgressReport {
    pub fn iter(&self) -> std::slice::Iter<'_, ProgressEntry> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProgressReport {
    type Item = &'a ProgressEntry;
    type IntoIter = std::slice::Iter<'a, ProgressEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.sessions.iter()
    }
}

// ============================================================================
// Frame Acknowledgement
// ============================================================================

/// Response to a frame submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameAck {
    pub frame_saved: bool,
    pub feedback: String,
    pub feedback_source: FeedbackSource,
    pub rep_count: u32,
    pub stage: String,
}

impl FrameAck {
    pub fn new(frame: &Frame, feedback: Feedback) -> Self {
        Self {
            frame_saved: true,
            feedback: feedback.text,
            feedback_source: feedback.source,
            rep_count: frame.rep_count,
            stage: frame.stage.clone(),
        }
    }
}
