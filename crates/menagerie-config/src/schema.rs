//! Configuration sections.

use serde::{Deserialize, Serialize};

use menagerie_core::UnknownFieldsPolicy;
use menagerie_telemetry::{LogConfig, LogFormat, MetricsConfig};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Prefix every route is mounted under (e.g. "/api"); empty for none.
    #[serde(default)]
    pub mount_path: String,

    /// Seconds to wait for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            mount_path: String::new(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Level or filter directive.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// ANSI colors in pretty output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include file and line in log lines.
    #[serde(default)]
    pub include_location: bool,
}

fn default_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            format: LogFormat::Json,
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts into the telemetry crate's settings.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            file_line_info: self.include_location,
            include_target: true,
            ansi: self.ansi_enabled,
        }
    }
}

/// Prometheus exporter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Whether to serve metrics.
    #[serde(default)]
    pub enabled: bool,

    /// Exporter listen address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

fn default_metrics_addr() -> String {
    menagerie_telemetry::metrics::DEFAULT_METRICS_ADDR.to_string()
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

impl MetricsSection {
    /// Converts into the telemetry crate's settings.
    #[must_use]
    pub fn to_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.enabled,
            addr: self.addr.clone(),
        }
    }
}

/// Contract validation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Handling of request keys no contract declares.
    #[serde(default)]
    pub unknown_fields: UnknownFieldsPolicy,
}
