//! # Menagerie Core
//!
//! Transport-independent building blocks of the Menagerie API:
//!
//! - [`Schema`] - Declarative field trees for request and response contracts
//! - [`validate`] - The contract validator producing a [`ValidationResult`]
//! - [`Service`] - The business-logic capability invoked by an action
//! - [`Fault`] - The closed set of failures and their HTTP mapping
//! - [`Action`] - The per-route validate → invoke → validate → respond pipeline
//! - [`RequestContext`] - Per-request identifiers carried through the pipeline

#![doc(html_root_url = "https://docs.rs/menagerie-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod action;
mod context;
pub mod fault;
pub mod schema;
pub mod service;
pub mod validate;

pub use action::{Action, ActionBuilder, ActionResponse, Stage};
pub use context::{RequestContext, RequestId};
pub use fault::{Fault, FieldErrors, GENERIC_ERROR_MESSAGE};
pub use schema::{Field, Kind, Schema, SchemaBuilder, SchemaError};
pub use service::{FnService, Params, Service, ServiceError, ServiceResult, StubService};
pub use validate::{validate, validate_with, UnknownFieldsPolicy, ValidationResult};
