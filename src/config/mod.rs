//! Service Configuration Module
//!
//! Provides service configuration loaded from TOML files.
//!
//! ## Loading Order
//!
//! 1. `PULSE_CONFIG` environment variable (path to TOML file)
//! 2. `pulse.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Environment overrides (`GEMINI_API_KEY`, `PULSE_SERVER_ADDR`) are applied
//! after the file is read.

mod pulse_config;
pub mod validation;

pub use pulse_config::*;
