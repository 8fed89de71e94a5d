// Export inspector configuration

use crate::config::parse_env_var;

/// Export inspector configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Maximum bytes read or previewed from a single file (default: 2 MB)
    pub max_read_bytes: u64,
    /// Preview row count when the caller does not specify one (default: 20)
    pub default_preview_rows: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: 2_000_000,
            default_preview_rows: 20,
        }
    }
}

impl ExportConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = ExportConfig::default();
        config.max_read_bytes = parse_env_var("RWORKD_MAX_READ_BYTES", config.max_read_bytes);
        config
    }
}
