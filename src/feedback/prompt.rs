//! Coaching prompt construction

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{ExerciseType, Frame};

/// Number of trailing history frames embedded in the prompt
pub const HISTORY_WINDOW: usize = 5;

/// Word budget requested from the service (not enforced locally)
pub const MAX_FEEDBACK_WORDS: usize = 50;

/// Placeholder used when the session has no history yet
const FIRST_EXERCISE: &str = "First exercise";

/// History row as embedded in the prompt
#[derive(Serialize)]
struct HistoryEntry<'a> {
    stage: &'a str,
    rep_count: u32,
    angles: &'a BTreeMap<String, f64>,
    timestamp: f64,
}

/// Build the coaching prompt for one frame.
///
/// `history` is the session's frame list in arrival order; only the last
/// `HISTORY_WINDOW` entries are included.
pub fn build_prompt(exercise: ExerciseType, frame: &Frame, history: &[Frame]) -> String {
    let angles = serde_json::to_string(&frame.angles).unwrap_or_else(|_| "{}".to_string());

    let history_str = if history.is_empty() {
        FIRST_EXERCISE.to_string()
    } else {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let recent: Vec<HistoryEntry<'_>> = history[start..]
            .iter()
            .map(|f| HistoryEntry {
                stage: &f.stage,
                rep_count: f.rep_count,
                angles: &f.angles,
                timestamp: f.timestamp,
            })
            .collect();
        serde_json::to_string(&recent).unwrap_or_else(|_| FIRST_EXERCISE.to_string())
    };

    // Single pass: client-supplied text is never re-scanned for placeholders.
    format!(
        r#"You are an AI physiotherapy assistant analyzing a {exercise} exercise.

Current Exercise Data:
- Exercise: {exercise}
- Current Stage: {stage}
- Rep Count: {rep_count}
- Joint Angles: {angles}

Session History: {history}

Provide concise, encouraging feedback (max {max_words} words) focusing on:
1. Form correction if angles are suboptimal
2. Encouragement for good performance
3. Specific tips for {exercise} technique

Response should be motivational and actionable."#,
        exercise = exercise.as_str(),
        stage = frame.stage,
        rep_count = frame.rep_count,
        angles = angles,
        history = history_str,
        max_words = MAX_FEEDBACK_WORDS,
    )
}
