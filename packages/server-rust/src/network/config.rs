//! Network configuration types for the Themekit server.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the theme server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Directory holding `<tenant>.tokens.json` files.
    pub tokens_dir: PathBuf,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
    /// Load tokens and derive CSS in middleware, before handlers run.
    pub prewarm_theme: bool,
    /// Maximum time to wait for in-flight requests during shutdown.
    pub drain_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            tokens_dir: PathBuf::from("tokens"),
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            prewarm_theme: false,
            drain_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_config_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.tokens_dir, PathBuf::from("tokens"));
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.prewarm_theme);
        assert_eq!(config.drain_timeout, Duration::from_secs(30));
    }
}
