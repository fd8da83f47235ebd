//! Coaching feedback
//!
//! - `cache`: signature-keyed store of previously generated text
//! - `prompt`: prompt construction for the generative text service
//! - `generator`: cache-first generation with a canned fallback

pub mod cache;
pub mod generator;
pub mod prompt;

pub use cache::{FeedbackCache, FeedbackKey};
pub use generator::{fallback_message, FeedbackGenerator};
