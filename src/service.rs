//! Exercise-session service
//!
//! The caller-facing operations: start a session, submit a frame, end a
//! session, summarize a session, report progress and manage patient
//! profiles. Frame submission runs the full pipeline:
//!
//! 1. load the session and check access
//! 2. evaluate the frame against prior frames
//! 3. persist the frame and raise the session rep count
//! 4. re-read session state for history
//! 5. generate and persist feedback
//!
//! Each write is a single independent row or a single-field update, so a
//! task cancelled between steps leaves the session valid (at worst missing
//! feedback for the last frame), and a concurrent `end_session` is never
//! undone by a frame in flight.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::can_access;
use crate::aggregation::{ProgressAggregator, SessionAggregator};
use crate::config::PulseConfig;
use crate::error::{CoreError, CoreResult};
use crate::feedback::{FeedbackCache, FeedbackGenerator};
use crate::llm::LlmBackend;
use crate::session::evaluate_frame;
use crate::storage::Store;
use crate::types::{
    ExerciseType, FeedbackRecord, FrameAck, FrameInput, Identity, PatientProfile, ProfileInput,
    ProgressReport, Session, SessionSummary,
};

/// Shared entry point for all session operations
pub struct ExerciseService {
    store: Arc<dyn Store>,
    generator: FeedbackGenerator,
    sessions: SessionAggregator,
    progress: ProgressAggregator,
    default_window_days: i64,
}

impl ExerciseService {
    pub fn new(
        store: Arc<dyn Store>,
        generator: FeedbackGenerator,
        default_window_days: i64,
    ) -> Self {
        Self {
            sessions: SessionAggregator::new(Arc::clone(&store)),
            progress: ProgressAggregator::new(Arc::clone(&store)),
            store,
            generator,
            default_window_days,
        }
    }

    /// Build the service from config with the given store and text backend
    pub fn from_config(
        config: &PulseConfig,
        store: Arc<dyn Store>,
        backend: Arc<dyn LlmBackend>,
    ) -> Self {
        let cache = Arc::new(FeedbackCache::with_capacity_setting(
            config.feedback.cache_capacity,
        ));
        let generator = FeedbackGenerator::new(
            backend,
            cache,
            Duration::from_secs(config.llm.timeout_secs),
        );
        Self::new(store, generator, config.progress.default_window_days)
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn generator(&self) -> &FeedbackGenerator {
        &self.generator
    }

    /// Start a new session owned by the requester
    pub async fn start_session(
        &self,
        requester: &Identity,
        exercise: ExerciseType,
    ) -> CoreResult<Session> {
        let session = Session::new(requester.user_id.clone(), exercise, Utc::now());
        let stored = self.store.insert_session(&session).await?;

        info!(
            session_id = %stored.id,
            user_id = %stored.user_id,
            exercise = %stored.exercise_type,
            "Session started"
        );
        Ok(stored)
    }

    /// Validate, persist and coach one frame
    pub async fn submit_frame(
        &self,
        requester: &Identity,
        session_id: Uuid,
        input: &FrameInput,
    ) -> CoreResult<FrameAck> {
        let session = self.accessible_session(requester, session_id).await?;

        let prior = self.store.frames_for_session(session_id).await?;
        let frame = evaluate_frame(session_id, &prior, input, Utc::now())?;
        let frame = self.store.insert_frame(&frame).await?;

        // The stored count never drops, so a stale read only skips a no-op.
        if frame.rep_count > session.total_reps {
            self.store
                .raise_total_reps(session_id, frame.rep_count)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("session {session_id}")))?;
        }

        let summary = self
            .sessions
            .summarize(session_id, requester)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("session {session_id}")))?;

        let feedback = self
            .generator
            .generate(session.exercise_type, &frame, &summary.frames)
            .await;

        self.store
            .insert_feedback(&FeedbackRecord {
                session_id,
                feedback_text: feedback.text.clone(),
                created_at: Utc::now(),
            })
            .await?;

        debug!(
            session_id = %session_id,
            stage = %frame.stage,
            rep_count = frame.rep_count,
            source = ?feedback.source,
            "Frame processed"
        );

        Ok(FrameAck::new(&frame, feedback))
    }

    /// Close a session. An already-ended session keeps its end time.
    pub async fn end_session(&self, requester: &Identity, session_id: Uuid) -> CoreResult<Session> {
        self.accessible_session(requester, session_id).await?;

        let session = self
            .store
            .close_session(session_id, Utc::now())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("session {session_id}")))?;
        info!(session_id = %session_id, total_reps = session.total_reps, "Session ended");
        Ok(session)
    }

    pub async fn session_summary(
        &self,
        requester: &Identity,
        session_id: Uuid,
    ) -> CoreResult<SessionSummary> {
        self.sessions
            .summarize(session_id, requester)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("session {session_id}")))
    }

    /// Progress for `user_id` over `window_days` (default from config)
    pub async fn progress(
        &self,
        requester: &Identity,
        user_id: &str,
        window_days: Option<i64>,
    ) -> CoreResult<ProgressReport> {
        if !can_access(requester, user_id) {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        self.progress
            .progress(user_id, window_days.unwrap_or(self.default_window_days))
            .await
    }

    /// Create or replace the profile of `input.user_id`.
    ///
    /// Patients may only save their own profile; physio and admin users may
    /// save one for anyone.
    pub async fn save_profile(
        &self,
        requester: &Identity,
        input: ProfileInput,
    ) -> CoreResult<PatientProfile> {
        if input.user_id.trim().is_empty() {
            return Err(CoreError::Validation("user_id must not be empty".to_string()));
        }
        if !can_access(requester, &input.user_id) {
            return Err(CoreError::NotFound(format!("user {}", input.user_id)));
        }
        for (field, value) in [("height", input.height), ("weight", input.weight)] {
            if let Some(v) = value {
                if !(v.is_finite() && v > 0.0) {
                    return Err(CoreError::Validation(format!(
                        "{field} must be a positive number, got {v}"
                    )));
                }
            }
        }

        let profile = PatientProfile::from_input(input, Utc::now());
        let saved = self.store.upsert_profile(&profile).await?;
        info!(
            user_id = %saved.user_id,
            saved_by = %requester.user_id,
            "Patient profile saved"
        );
        Ok(saved)
    }

    pub async fn profile(&self, requester: &Identity, user_id: &str) -> CoreResult<PatientProfile> {
        if !can_access(requester, user_id) {
            return Err(CoreError::NotFound(format!("user {user_id}")));
        }
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("profile for user {user_id}")))
    }

    async fn accessible_session(
        &self,
        requester: &Identity,
        session_id: Uuid,
    ) -> CoreResult<Session> {
        match self.store.get_session(session_id).await? {
            Some(session) if can_access(requester, &session.user_id) => Ok(session),
            _ => Err(CoreError::NotFound(format!("session {session_id}"))),
        }
    }
}
