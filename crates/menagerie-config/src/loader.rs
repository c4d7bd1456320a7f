//! Layered configuration loader.

use std::env;
use std::fs;
use std::path::Path;

use menagerie_core::UnknownFieldsPolicy;
use menagerie_telemetry::LogFormat;

use crate::{ConfigError, MenagerieConfig};

/// Loads [`MenagerieConfig`] from defaults, a file, `.env` and the
/// environment.
///
/// # Example
///
/// ```no_run
/// use menagerie_config::ConfigLoader;
///
/// # fn main() -> Result<(), menagerie_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("menagerie.toml")?
///     .with_dotenv()?
///     .with_env_prefix("MENAGERIE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: MenagerieConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = MenagerieConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = MenagerieConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file, replacing earlier layers.
    ///
    /// Sections and keys the file omits take their defaults.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.with_string(&content, format)
    }

    /// Loads a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Parses configuration text in the given format ("toml" or "json").
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Reads `.env` from the working directory or its parents, if present.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<MenagerieConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let mut vars: Vec<(String, String)> =
                env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
            vars.sort();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &marker)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MenagerieConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, marker: &str) -> Result<(), ConfigError> {
        let path = key.strip_prefix(marker).unwrap_or(key);
        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "MOUNT_PATH"] => config.server.mount_path = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }

            ["LOGGING", "ENABLED"] => config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => config.logging.ansi_enabled = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = bool_var(key, value)?;
            }

            ["METRICS", "ENABLED"] => config.metrics.enabled = bool_var(key, value)?,
            ["METRICS", "ADDR"] => config.metrics.addr = value.to_string(),

            ["CONTRACT", "UNKNOWN_FIELDS"] => {
                config.contract.unknown_fields = match value.to_lowercase().as_str() {
                    "ignore" => UnknownFieldsPolicy::Ignore,
                    "reject" => UnknownFieldsPolicy::Reject,
                    _ => return Err(ConfigError::env_parse_error(key, "expected 'ignore' or 'reject'")),
                };
            }

            _ => return Err(ConfigError::UnknownEnvKey { var: key.to_string() }),
        }

        Ok(())
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
