//! Session summaries

use std::sync::Arc;
use uuid::Uuid;

use crate::access::can_access;
use crate::error::CoreResult;
use crate::storage::Store;
use crate::types::{FeedbackRecord, Frame, Identity, SessionSummary};

/// Number of feedback texts reported as "latest"
pub const LATEST_FEEDBACK_COUNT: usize = 3;

/// Highest rep count across frames; reps are client-side counters so the
/// maximum is authoritative, not a sum.
pub fn total_reps(frames: &[Frame]) -> u32 {
    frames.iter().map(|f| f.rep_count).max().unwrap_or(0)
}

/// Last `LATEST_FEEDBACK_COUNT` feedback texts, oldest first
pub fn latest_feedback(feedback: &[FeedbackRecord]) -> Vec<String> {
    let start = feedback.len().saturating_sub(LATEST_FEEDBACK_COUNT);
    feedback[start..].iter().map(|f| f.feedback_text.clone()).collect()
}

/// Builds session summaries from the store
#[derive(Clone)]
pub struct SessionAggregator {
    store: Arc<dyn Store>,
}

impl SessionAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Summarize a session for `requester`.
    ///
    /// Returns `Ok(None)` when the session does not exist or the requester
    /// may not access it.
    pub async fn summarize(
        &self,
        session_id: Uuid,
        requester: &Identity,
    ) -> CoreResult<Option<SessionSummary>> {
        let session = match self.store.get_session(session_id).await? {
            Some(s) if can_access(requester, &s.user_id) => s,
            _ => return Ok(None),
        };

        let frames = self.store.frames_for_session(session_id).await?;
        let feedback = self.store.feedback_for_session(session_id).await?;

        Ok(Some(SessionSummary {
            total_reps: total_reps(&frames),
            total_frames: frames.len(),
            feedback_count: feedback.len(),
            latest_feedback: latest_feedback(&feedback),
            session,
            frames,
            feedback,
        }))
    }
}
