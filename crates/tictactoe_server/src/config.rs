//! Server configuration.

use crate::ConfigError;
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tunables for the HTTP server and the background tasks.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    #[setters(into)]
    host: String,

    /// Port to bind.
    port: u16,

    /// Seconds between liveness sweeps.
    sweep_interval_secs: u64,

    /// Seconds a participant may go without polling before eviction.
    client_timeout_secs: u64,

    /// Seconds a finished game stays on screen before the board resets.
    reset_delay_secs: u64,

    /// Whether sweeps also drop idle clients from the waiting room.
    prune_pending: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            sweep_interval_secs: 1,
            client_timeout_secs: 30,
            reset_delay_secs: 10,
            prune_pending: true,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Rejects intervals the background tasks cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::new("sweep_interval_secs must be positive"));
        }
        if self.client_timeout_secs == 0 {
            return Err(ConfigError::new("client_timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Interval between liveness sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Liveness timeout.
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    /// Delay before a finished game is reset.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_secs(self.reset_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.client_timeout(), Duration::from_secs(30));
        assert_eq!(config.reset_delay(), Duration::from_secs(10));
        assert!(*config.prune_pending());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str("port = 9000\nclient_timeout_secs = 5").unwrap();
        assert_eq!(*config.port(), 9000);
        assert_eq!(config.client_timeout(), Duration::from_secs(5));
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_setters() {
        let config = ServerConfig::default().with_host("0.0.0.0").with_port(3000);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(*config.port(), 3000);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = ServerConfig::default().with_sweep_interval_secs(0);
        assert!(config.validate().is_err());
    }
}
