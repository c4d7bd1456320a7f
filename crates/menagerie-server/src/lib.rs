//! # Menagerie Server
//!
//! HTTP transport for Menagerie actions, built on Hyper and Tokio.
//!
//! An [`Api`] owns the route table. For each request it:
//!
//! 1. Strips the optional mount prefix and matches method and path
//! 2. Merges body, query and path parameters (later sources win)
//! 3. Runs the matched [`Action`](menagerie_core::Action)
//! 4. Renders the result as JSON with an `x-request-id` header
//!
//! A [`Server`] accepts connections and hands each request to the `Api`,
//! draining in-flight connections on shutdown.
//!
//! ## Example
//!
//! ```rust,ignore
//! use menagerie_server::{Api, Server, ShutdownSignal};
//!
//! let api = Api::builder()
//!     .route(Method::GET, "/books", books)?
//!     .build();
//!
//! Server::new(api, &config.server).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/menagerie-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod error;
mod params;
mod server;
pub mod shutdown;

pub use api::{Api, ApiBuilder, HttpResponse, REQUEST_ID_HEADER};
pub use error::ServerError;
pub use params::merge_params;
pub use server::Server;
pub use shutdown::{ConnectionTracker, ShutdownSignal};
