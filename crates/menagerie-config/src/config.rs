//! Root configuration type.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use menagerie_telemetry::LogFormat;

use crate::{ConfigError, ContractConfig, LoggingConfig, MetricsSection, ServerConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete Menagerie configuration.
///
/// # Example
///
/// ```
/// use menagerie_config::MenagerieConfig;
///
/// let config = MenagerieConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MenagerieConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics exporter settings.
    #[serde(default)]
    pub metrics: MetricsSection,

    /// Contract validation settings.
    #[serde(default)]
    pub contract: ContractConfig,
}

impl MenagerieConfig {
    /// Checks values that deserialization cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        let mount = &self.server.mount_path;
        if !mount.is_empty() && (!mount.starts_with('/') || mount.ends_with('/')) {
            return Err(ConfigError::invalid_value(
                "server.mount_path",
                "must be empty or start with '/' and not end with '/'",
            ));
        }

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }

        // Full filter directives are accepted when they contain a target.
        let level = self.logging.level.to_lowercase();
        if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        if self.metrics.enabled && self.metrics.addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "metrics.addr",
                format!("invalid socket address: {}", self.metrics.addr),
            ));
        }

        Ok(())
    }

    /// Local development preset: pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                http_addr: "127.0.0.1:8080".to_string(),
                ..ServerConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON logs and metrics.
    #[must_use]
    pub fn production() -> Self {
        Self {
            metrics: MetricsSection {
                enabled: true,
                ..MetricsSection::default()
            },
            ..Self::default()
        }
    }

    /// Shutdown grace period.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}
