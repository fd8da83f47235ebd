//! In-memory store
//!
//! Thread-safe via `RwLock`. Not durable, data is lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::types::{FeedbackRecord, Frame, PatientProfile, Session};

/// In-memory persistence for testing and minimal deployments
#[derive(Default)]
pub struct InMemoryStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    frames: RwLock<HashMap<Uuid, Vec<Frame>>>,
    feedback: RwLock<HashMap<Uuid, Vec<FeedbackRecord>>>,
    profiles: RwLock<HashMap<String, PatientProfile>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a stored session under a single write lock
    fn modify_session<F>(&self, id: Uuid, f: F) -> Result<Option<Session>, StoreError>
    where
        F: FnOnce(&mut Session),
    {
        let mut store = self.sessions.write().map_err(poisoned)?;
        Ok(store.get_mut(&id).map(|session| {
            f(session);
            session.clone()
        }))
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<Session, StoreError> {
        let mut store = self.sessions.write().map_err(poisoned)?;
        store.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        let store = self.sessions.read().map_err(poisoned)?;
        Ok(store.get(&id).cloned())
    }

    async fn raise_total_reps(
        &self,
        id: Uuid,
        rep_count: u32,
    ) -> Result<Option<Session>, StoreError> {
        self.modify_session(id, |s| s.total_reps = s.total_reps.max(rep_count))
    }

    async fn close_session(
        &self,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        self.modify_session(id, |s| {
            s.end_time.get_or_insert(end_time);
        })
    }

    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let store = self.sessions.read().map_err(poisoned)?;
        let mut sessions: Vec<Session> = store
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn insert_frame(&self, frame: &Frame) -> Result<Frame, StoreError> {
        let mut store = self.frames.write().map_err(poisoned)?;
        store.entry(frame.session_id).or_default().push(frame.clone());
        Ok(frame.clone())
    }

    async fn frames_for_session(&self, session_id: Uuid) -> Result<Vec<Frame>, StoreError> {
        let store = self.frames.read().map_err(poisoned)?;
        Ok(store.get(&session_id).cloned().unwrap_or_default())
    }

    async fn insert_feedback(
        &self,
        record: &FeedbackRecord,
    ) -> Result<FeedbackRecord, StoreError> {
        let mut store = self.feedback.write().map_err(poisoned)?;
        store.entry(record.session_id).or_default().push(record.clone());
        Ok(record.clone())
    }

    async fn feedback_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        let store = self.feedback.read().map_err(poisoned)?;
        Ok(store.get(&session_id).cloned().unwrap_or_default())
    }

    async fn upsert_profile(
        &self,
        profile: &PatientProfile,
    ) -> Result<PatientProfile, StoreError> {
        let mut store = self.profiles.write().map_err(poisoned)?;
        store.insert(profile.user_id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<PatientProfile>, StoreError> {
        let store = self.profiles.read().map_err(poisoned)?;
        Ok(store.get(user_id).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
