//! Session types: ExerciseType, Session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise Type
// ============================================================================

/// Guided exercise performed during a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Squat,
    Pushup,
    ShoulderRaise,
    KneeBend,
}

impl ExerciseType {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Squat => "squat",
            ExerciseType::Pushup => "pushup",
            ExerciseType::ShoulderRaise => "shoulder_raise",
            ExerciseType::KneeBend => "knee_bend",
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Session
// ============================================================================

/// One continuous exercise attempt by a user.
///
/// Created on start, mutated as frames arrive (`total_reps`), closed by
/// setting `end_time`. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    /// Owning user
    pub user_id: String,
    pub exercise_type: ExerciseType,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Highest rep count reported by the capture client so far
    #[serde(default)]
    pub total_reps: u32,
    #[serde(default)]
    pub avg_score: Option<f64>,
}

impl Session {
    /// Create a fresh session starting at `start_time`
    pub fn new(
        user_id: impl Into<String>,
        exercise_type: ExerciseType,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            exercise_type,
            start_time,
            end_time: None,
            total_reps: 0,
            avg_score: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_type_wire_names() {
        let json = serde_json::to_string(&ExerciseType::ShoulderRaise).unwrap();
        assert_eq!(json, "\"shoulder_raise\"");
        let parsed: ExerciseType = serde_json::from_str("\"knee_bend\"").unwrap();
        assert_eq!(parsed, ExerciseType::KneeBend);
        assert_eq!(ExerciseType::Pushup.to_string(), "pushup");
    }

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new("user-1", ExerciseType::Squat, Utc::now());
        assert_eq!(session.total_reps, 0);
        assert!(session.avg_score.is_none());
        assert!(session.is_active());
    }
}
