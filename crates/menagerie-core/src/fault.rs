//! Fault types and their HTTP mapping.
//!
//! Every way an action can fail is a variant of [`Fault`]. The mapping from a
//! fault to its status code and JSON body lives in exactly two exhaustive
//! `match` expressions, [`Fault::status_code`] and [`Fault::body`], so adding a
//! variant without deciding its response does not compile.
//!
//! | Fault | Status | Body |
//! |---|---|---|
//! | `RequestValidation` | 422 | `{"errors": {path: [messages]}}` |
//! | `MalformedBody` | 400 | `{"error": "Malformed request body"}` |
//! | `MalformedQuery` | 400 | `{"error": "Malformed query string"}` |
//! | `Forbidden` | 403 | `{"error": "Forbidden"}` |
//! | `NotFound` | 404 | `{"error": "Not found"}` |
//! | `ServiceFailure` | 500 | generic message |
//! | `ResponseShape` | 500 | generic message |
//! | `Unexpected` | 500 | generic message |
//!
//! Server-side reasons are carried for logging and never rendered into a
//! response body.

use std::fmt;

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::service::ServiceError;

/// Body message for every 500 response.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong processing your request";

/// Field-level validation errors, keyed by field path.
///
/// Paths keep the order in which they were first reported and each path
/// keeps its messages in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for a field path.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Returns the messages recorded for a path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.fields.get(path).map(Vec::as_slice)
    }

    /// Returns the distinct paths in report order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over `(path, message)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(path, msgs)| msgs.iter().map(move |m| (path.as_str(), m.as_str())))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (_, message)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{message}")?;
        }
        Ok(())
    }
}

/// A failure while processing one request.
#[derive(Debug, Error)]
pub enum Fault {
    /// Inbound parameters do not satisfy the request contract.
    #[error("request validation failed: {0}")]
    RequestValidation(FieldErrors),

    /// The request body is not a JSON object.
    #[error("malformed request body: {reason}")]
    MalformedBody {
        /// Parser or shape diagnostic.
        reason: String,
    },

    /// The query string cannot be decoded.
    #[error("malformed query string: {reason}")]
    MalformedQuery {
        /// Decoder diagnostic.
        reason: String,
    },

    /// A deeper layer denied access.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why access was denied.
        reason: String,
    },

    /// A deeper layer could not find the resource.
    #[error("not found: {reason}")]
    NotFound {
        /// What was missing.
        reason: String,
    },

    /// The service reported a failure.
    #[error("service failed: {reason}")]
    ServiceFailure {
        /// The failure reason returned by the service.
        reason: String,
    },

    /// The service returned a value that violates the response contract.
    #[error("response does not match contract: {0}")]
    ResponseShape(FieldErrors),

    /// Anything else, including panics inside a service.
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Diagnostic message.
        message: String,
    },
}

impl Fault {
    /// Creates a forbidden fault.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Creates a not-found fault.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    /// Creates a malformed-body fault.
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            reason: reason.into(),
        }
    }

    /// Creates a malformed-query fault.
    pub fn malformed_query(reason: impl Into<String>) -> Self {
        Self::MalformedQuery {
            reason: reason.into(),
        }
    }

    /// Creates an unexpected fault.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Stable snake_case name, used as a log field and metric label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RequestValidation(_) => "request_validation",
            Self::MalformedBody { .. } => "malformed_body",
            Self::MalformedQuery { .. } => "malformed_query",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::ServiceFailure { .. } => "service_failure",
            Self::ResponseShape(_) => "response_shape",
            Self::Unexpected { .. } => "unexpected",
        }
    }

    /// Returns the HTTP status for this fault.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MalformedBody { .. } | Self::MalformedQuery { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ServiceFailure { .. } | Self::ResponseShape(_) | Self::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the JSON body for this fault.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::RequestValidation(errors) => json!({ "errors": errors }),
            Self::MalformedBody { .. } => json!({ "error": "Malformed request body" }),
            Self::MalformedQuery { .. } => json!({ "error": "Malformed query string" }),
            Self::Forbidden { .. } => json!({ "error": "Forbidden" }),
            Self::NotFound { .. } => json!({ "error": "Not found" }),
            Self::ServiceFailure { .. } | Self::ResponseShape(_) | Self::Unexpected { .. } => {
                json!({ "error": GENERIC_ERROR_MESSAGE })
            }
        }
    }

    /// Returns `true` for faults caused by the caller.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<ServiceError> for Fault {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Failure(reason) => Self::ServiceFailure { reason },
            ServiceError::Forbidden(reason) => Self::Forbidden { reason },
            ServiceError::NotFound(reason) => Self::NotFound { reason },
            ServiceError::Unexpected(source) => Self::Unexpected {
                message: format!("{source:#}"),
            },
        }
    }
}
