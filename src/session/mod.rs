//! Per-session frame handling

pub mod evaluator;

pub use evaluator::evaluate_frame;
