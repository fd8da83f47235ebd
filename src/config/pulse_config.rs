//! PhysioPulse configuration - every tunable as a TOML value
//!
//! Each section implements `Default`, so an empty or missing file yields a
//! working in-memory-free setup backed by sled and the fallback feedback path.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::UserRole;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a PhysioPulse deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistent store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generative text service
    #[serde(default)]
    pub llm: LlmConfig,

    /// Feedback cache tuning
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Progress reporting defaults
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Static bearer tokens
    #[serde(default)]
    pub auth: AuthConfig,
}

impl PulseConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PULSE_CONFIG` environment variable
    /// 2. `./pulse.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        let mut config = Self::load_file_or_default();
        config.apply_env_overrides();
        config
    }

    fn load_file_or_default() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("PULSE_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from PULSE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from PULSE_CONFIG, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "PULSE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./pulse.toml
        let local = PathBuf::from("pulse.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./pulse.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./pulse.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No pulse.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEMINI_API_KEY` and `PULSE_SERVER_ADDR` on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(addr) = std::env::var("PULSE_SERVER_ADDR") {
            self.server.addr = addr;
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.llm.timeout_secs == 0 {
            errors.push("llm.timeout_secs must be greater than 0".to_string());
        }
        if self.progress.default_window_days <= 0 {
            errors.push(format!(
                "progress.default_window_days must be positive, got {}",
                self.progress.default_window_days
            ));
        }
        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for entry in &self.auth.tokens {
            if entry.token.is_empty() {
                errors.push(format!("auth.tokens: empty token for user '{}'", entry.user_id));
            } else if !seen.insert(entry.token.as_str()) {
                errors.push(format!("auth.tokens: duplicate token for user '{}'", entry.user_id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {err}", path = .0.display(), err = .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({path}): {err}", path = .0.display(), err = .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Overridden by `PULSE_SERVER_ADDR` or `--addr`.
    #[serde(default = "default_server_addr")]
    pub addr: String,
    /// Allowed CORS origins; `"*"` allows any, empty means same-origin only
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            cors_origins: Vec::new(),
        }
    }
}

/// Persistent store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Sled database directory
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Keep everything in memory (nothing survives a restart)
    #[serde(default)]
    pub in_memory: bool,
}

fn default_storage_path() -> String {
    crate::storage::DEFAULT_DB_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            in_memory: false,
        }
    }
}

/// Generative text service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; when absent every uncached frame gets the fallback message
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Upper bound on a single generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Feedback cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Maximum cached signatures; `0` keeps every entry
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    1024
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Progress reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_window_days")]
    pub default_window_days: i64,
}

fn default_window_days() -> i64 {
    crate::aggregation::DEFAULT_WINDOW_DAYS
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            default_window_days: default_window_days(),
        }
    }
}

/// Static bearer-token table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

/// One bearer token and the identity it resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::Patient
}
