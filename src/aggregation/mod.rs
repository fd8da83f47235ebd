//! Read-only aggregation over stored sessions
//!
//! - `session`: per-session summary (frames, feedback, derived totals)
//! - `progress`: a user's sessions inside a trailing time window

pub mod progress;
pub mod session;

pub use progress::{ProgressAggregator, DEFAULT_WINDOW_DAYS};
pub use session::{SessionAggregator, LATEST_FEEDBACK_COUNT};
