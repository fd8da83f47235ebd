//! Feedback types: FeedbackRecord, Feedback, FeedbackSource, FallbackReason

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coaching text appended to a session (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub session_id: Uuid,
    pub feedback_text: String,
    pub created_at: DateTime<Utc>,
}

/// Why the generator fell back to the canned message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The generative service did not answer within the configured timeout
    Timeout,
    /// The generative service returned an error or was unavailable
    ServiceError(String),
    /// The service answered with no usable text
    EmptyResponse,
}

/// Where a piece of feedback came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSource {
    Cached,
    Generated,
    Fallback(FallbackReason),
}

/// Feedback text together with the path that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub source: FeedbackSource,
}
