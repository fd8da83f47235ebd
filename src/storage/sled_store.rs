//! Sled-backed store
//!
//! Trees:
//! - `sessions`: session UUID bytes -> JSON `Session`
//! - `frames`:   session UUID bytes ++ big-endian sequence -> JSON `Frame`
//! - `feedback`: session UUID bytes ++ big-endian sequence -> JSON `FeedbackRecord`
//! - `profiles`: user id bytes -> JSON `PatientProfile`
//!
//! Sequences come from `Db::generate_id()`, which is monotonic, so a prefix
//! scan over a session returns rows in arrival order. Session mutations go
//! through `update_and_fetch` so each one is a compare-and-swap on the
//! current row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::types::{FeedbackRecord, Frame, PatientProfile, Session};

/// Default database path
pub const DEFAULT_DB_PATH: &str = "./data/physio_pulse.db";

/// Sled store for sessions, frames, feedback and profiles
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
    sessions: sled::Tree,
    frames: sled::Tree,
    feedback: sled::Tree,
    profiles: sled::Tree,
}

impl SledStore {
    /// Open or create the store at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        let sessions = db.open_tree("sessions")?;
        let frames = db.open_tree("frames")?;
        let feedback = db.open_tree("feedback")?;
        let profiles = db.open_tree("profiles")?;

        tracing::info!("Session store opened at {:?}", path_ref);

        Ok(Self {
            db: Arc::new(db),
            sessions,
            frames,
            feedback,
            profiles,
        })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn row_key(&self, session_id: Uuid) -> Result<Vec<u8>, StoreError> {
        let seq = self.db.generate_id()?;
        let mut key = Vec::with_capacity(24);
        key.extend_from_slice(session_id.as_bytes());
        key.extend_from_slice(&seq.to_be_bytes());
        Ok(key)
    }

    fn scan_prefix<T: DeserializeOwned>(
        tree: &sled::Tree,
        session_id: Uuid,
    ) -> Result<Vec<T>, StoreError> {
        let mut rows = Vec::new();
        for item in tree.scan_prefix(session_id.as_bytes()) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    /// Atomically apply `apply` to the stored session.
    ///
    /// A row that fails to decode is left untouched and reported as a
    /// serialization error.
    fn modify_session<F>(&self, id: Uuid, mut apply: F) -> Result<Option<Session>, StoreError>
    where
        F: FnMut(&mut Session),
    {
        let mut failure: Option<serde_json::Error> = None;
        let updated = self.sessions.update_and_fetch(id.as_bytes(), |old| {
            failure = None;
            let bytes = old?;
            let encoded = serde_json::from_slice::<Session>(bytes).and_then(|mut session| {
                apply(&mut session);
                serde_json::to_vec(&session)
            });
            match encoded {
                Ok(value) => Some(value),
                Err(e) => {
                    failure = Some(e);
                    Some(bytes.to_vec())
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e.into());
        }
        match updated {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Store for SledStore {
    async fn insert_session(&self, session: &Session) -> Result<Session, StoreError> {
        let value = serde_json::to_vec(session)?;
        self.sessions.insert(session.id.as_bytes(), value)?;
        Ok(session.clone())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
        match self.sessions.get(id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
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
        let mut sessions = Vec::new();
        for item in self.sessions.iter() {
            let (_key, value) = item?;
            let session: Session = serde_json::from_slice(&value)?;
            if session.user_id == user_id {
                sessions.push(session);
            }
        }
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    async fn insert_frame(&self, frame: &Frame) -> Result<Frame, StoreError> {
        let key = self.row_key(frame.session_id)?;
        self.frames.insert(key, serde_json::to_vec(frame)?)?;
        Ok(frame.clone())
    }

    async fn frames_for_session(&self, session_id: Uuid) -> Result<Vec<Frame>, StoreError> {
        Self::scan_prefix(&self.frames, session_id)
    }

    async fn insert_feedback(
        &self,
        record: &FeedbackRecord,
    ) -> Result<FeedbackRecord, StoreError> {
        let key = self.row_key(record.session_id)?;
        self.feedback.insert(key, serde_json::to_vec(record)?)?;
        Ok(record.clone())
    }

    async fn feedback_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<FeedbackRecord>, StoreError> {
        Self::scan_prefix(&self.feedback, session_id)
    }

    async fn upsert_profile(
        &self,
        profile: &PatientProfile,
    ) -> Result<PatientProfile, StoreError> {
        self.profiles
            .insert(profile.user_id.as_bytes(), serde_json::to_vec(profile)?)?;
        Ok(profile.clone())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<PatientProfile>, StoreError> {
        match self.profiles.get(user_id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}
