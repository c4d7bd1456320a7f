//! # Menagerie
//!
//! A contract-validated HTTP API for books and pets.
//!
//! Every route is an [`Action`](menagerie_core::Action): the merged request
//! parameters are validated against the operation's request contract, the
//! bound [`Service`](menagerie_core::Service) runs, and its value is
//! validated against the response contract before it is returned.
//!
//! ## Example
//!
//! ```rust
//! use menagerie::{build_api, Services};
//! use menagerie_config::MenagerieConfig;
//!
//! let api = build_api(&MenagerieConfig::default(), Services::default()).unwrap();
//! assert_eq!(api.routes().count(), 5);
//! ```

#![doc(html_root_url = "https://docs.rs/menagerie/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
pub mod contracts;
pub mod schemas;
pub mod services;

pub use app::{build_api, AppError, Services};

pub use menagerie_config as config;
pub use menagerie_core as core;
pub use menagerie_server as server;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
