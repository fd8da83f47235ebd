//! Persistent store for sessions, frames, feedback and patient profiles
//!
//! `Store` abstracts the row store so backends can be swapped without
//! touching the service:
//! - `InMemoryStore`: in-process maps for tests and `--memory` runs
//! - `SledStore`: embedded sled database, one tree per table
//!
//! Writes are single-record and independent; there are no multi-record
//! transactions.

mod memory;
mod sled_store;

pub use memory::InMemoryStore;
pub use sled_store::{SledStore, DEFAULT_DB_PATH};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{FeedbackRecord, Frame, PatientProfile, Session};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Trait for pluggable persistence backends
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across async tasks. Session rows are never overwritten whole after
/// insertion: each mutation touches one field atomically, so concurrent
/// frame submissions and session closes cannot undo each other.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new session
    async fn insert_session(&self, session: &Session) -> Result<Session, StoreError>;

    /// Get a session by id
    async fn get_session(&self, id: Uuid) -> Result<Option<Session>, StoreError>;

    /// Raise `total_reps` to at least `rep_count`, leaving other fields as stored.
    /// Returns `None` when the session does not exist.
    async fn raise_total_reps(
        &self,
        id: Uuid,
        rep_count: u32,
    ) -> Result<Option<Session>, StoreError>;

    /// Set `end_time` unless the session is already closed.
    /// Returns `None` when the session does not exist.
    async fn close_session(
        &self,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError>;

    /// All sessions owned by a user, oldest start first
    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<Session>, StoreError>;

    /// Append a frame to its session
    async fn insert_frame(&self, frame: &Frame) -> Result<Frame, StoreError>;

    /// Frames of a session in arrival order
    async fn frames_for_session(&self, session_id: Uuid) -> Result<Vec<Frame>, StoreError>;

    /// Append a feedback record to its session
    async fn insert_feedback(
        &self,
        record: &FeedbackRecord,
    ) -> Result<FeedbackRecord, StoreError>;

    /// Feedback of a session in arrival order
    async fn feedback_for_session(
        &self,
        session_id: Uuid,
    ) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Create or replace the profile keyed by `profile.user_id`
    async fn upsert_profile(
        &self,
        profile: &PatientProfile,
    ) -> Result<PatientProfile, StoreError>;

    /// Profile of a user, if one was saved
    async fn get_profile(&self, user_id: &str) -> Result<Option<PatientProfile>, StoreError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}
