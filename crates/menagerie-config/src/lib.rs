//! Typed configuration for Menagerie.
//!
//! Configuration is loaded in layers, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML or JSON file
//! 3. A `.env` file
//! 4. Environment variables named `PREFIX__SECTION__KEY`
//!
//! Unknown keys in files are rejected.
//!
//! # Example
//!
//! ```
//! use menagerie_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string("[server]\nmount_path = \"/api\"", "toml")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.server.mount_path, "/api");
//! ```
//!
//! # Example file
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! mount_path = "/api"
//! shutdown_timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [contract]
//! unknown_fields = "ignore"
//! ```

#![doc(html_root_url = "https://docs.rs/menagerie-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::MenagerieConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{ContractConfig, LoggingConfig, MetricsSection, ServerConfig};

pub use menagerie_core::UnknownFieldsPolicy;
pub use menagerie_telemetry::LogFormat;
