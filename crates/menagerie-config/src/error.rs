//! Errors raised while loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named file does not exist.
    #[error("config file {path} does not exist")]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read config file {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The format is neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value deserialized but failed validation.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `server.mount_path`.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// An environment override names no known key.
    #[error("unknown configuration key in environment variable {var}")]
    UnknownEnvKey {
        /// The environment variable name.
        var: String,
    },

    /// An environment override has a value of the wrong type.
    #[error("{var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Failed to load a `.env` file.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    /// Creates a file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an environment parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ConfigError::file_not_found("/etc/menagerie.toml");
        assert_eq!(err.to_string(), "config file /etc/menagerie.toml does not exist");

        let err = ConfigError::invalid_value("server.mount_path", "must start with '/'");
        assert!(err.to_string().contains("server.mount_path"));

        let err = ConfigError::env_parse_error("MENAGERIE__METRICS__ENABLED", "expected boolean");
        assert!(err.to_string().contains("expected boolean"));
    }
}
