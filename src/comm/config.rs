// Comm configuration

use crate::config::parse_env_var;

/// Comm transport configuration
#[derive(Debug, Clone)]
pub struct CommConfig {
    /// Maximum accepted request line length in bytes (default: 8 MiB)
    pub max_line_bytes: usize,
    /// Response channel capacity (default: 64)
    pub channel_capacity: usize,
}

impl Default for CommConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 8 * 1024 * 1024,
            channel_capacity: 64,
        }
    }
}

impl CommConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = CommConfig::default();
        config.max_line_bytes = parse_env_var("RWORKD_MAX_LINE_BYTES", config.max_line_bytes);
        config
    }
}
