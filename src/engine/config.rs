// Engine configuration

use crate::config::parse_env_var;
use std::path::PathBuf;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interpreter binary override; `None` probes PATH and well-known locations
    pub interpreter: Option<PathBuf>,
    /// Default execution timeout in seconds (default: 120)
    pub default_timeout_secs: u64,
    /// Hard ceiling on per-request timeouts in seconds (default: 600)
    pub max_timeout_secs: u64,
    /// Maximum captured bytes per stream before truncation (default: 1 MiB)
    pub max_output_bytes: usize,
    /// Bounded wait for the execution lock in seconds (default: 5)
    pub lock_wait_secs: u64,
    /// Workspace image file name inside the state directory
    pub image_file_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            default_timeout_secs: 120,
            max_timeout_secs: 600,
            max_output_bytes: 1048576, // 1MB
            lock_wait_secs: 5,
            image_file_name: String::from("last_session.RData"),
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = EngineConfig::default();
        config.interpreter = std::env::var("RWORKD_RSCRIPT").ok().map(PathBuf::from);
        config.default_timeout_secs =
            parse_env_var("RWORKD_DEFAULT_TIMEOUT_SECS", config.default_timeout_secs);
        config.max_timeout_secs = parse_env_var("RWORKD_MAX_TIMEOUT_SECS", config.max_timeout_secs);
        config.max_output_bytes = parse_env_var("RWORKD_MAX_OUTPUT_BYTES", config.max_output_bytes);
        config.lock_wait_secs = parse_env_var("RWORKD_LOCK_WAIT_SECS", config.lock_wait_secs);
        config
    }

    /// Clamp a requested timeout to the enforced maximum, applying the default
    /// when absent.
    pub fn effective_timeout(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_timeout_secs)
            .min(self.max_timeout_secs)
            .max(1)
    }
}
