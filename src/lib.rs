//! PhysioPulse: exercise-session telemetry and coaching feedback
//!
//! Receives per-frame pose measurements from a client, records them against
//! a session, produces short coaching feedback for each frame and reports
//! session and multi-session progress. Patients keep a profile that their
//! physiotherapist can also maintain.
//!
//! ## Architecture
//!
//! - **Session**: frame validation ahead of persistence
//! - **Feedback**: cached feedback generation with a deterministic fallback
//! - **LLM**: generative text backends behind `LlmBackend`
//! - **Aggregation**: per-session summaries and windowed progress
//! - **Storage**: `Store` trait with in-memory and sled backends
//! - **API**: Axum HTTP surface with bearer-token identity

pub mod access;
pub mod aggregation;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod llm;
pub mod service;
pub mod session;
pub mod storage;
pub mod types;

pub use config::PulseConfig;
pub use error::{CoreError, CoreResult};
pub use service::ExerciseService;

pub use types::{
    BodySide, ExerciseType, Feedback, FeedbackSource, Frame, FrameAck, FrameInput, Identity,
    PatientProfile, ProfileInput, ProgressReport, Session, SessionSummary, UserRole,
};
