//! Shared data structures for the exercise-session telemetry pipeline
//!
//! This module defines the core types that flow through a session:
//! - Session: one continuous exercise attempt owned by a user
//! - FrameInput / Frame: per-frame joint angles with stage and rep metadata
//! - FeedbackRecord: coaching text appended to a session
//! - Identity / UserRole: the authenticated requester
//! - PatientProfile: per-user measurements and clinical context
//! - SessionSummary / ProgressReport: read-only aggregates

mod feedback;
mod frame;
mod identity;
mod profile;
mod session;
mod summary;

pub use feedback::*;
pub use frame::*;
pub use identity::*;
pub use profile::*;
pub use session::*;
pub use summary::*;
