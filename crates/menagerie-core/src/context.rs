//! Request context types.
//!
//! The [`RequestContext`] carries per-request identifiers from the transport
//! into actions and services.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
///
/// # Example
///
/// ```
/// use menagerie_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parses a request id supplied by a caller, e.g. from an
    /// `x-request-id` header.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context.
///
/// # Example
///
/// ```
/// use menagerie_core::RequestContext;
///
/// let ctx = RequestContext::new().with_operation_id("getPetById");
/// assert_eq!(ctx.operation_id(), Some("getPetById"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,

    /// The operation bound to the matched route (e.g. "createPet").
    operation_id: Option<String>,

    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            operation_id: None,
            started_at: Instant::now(),
        }
    }

    /// Replaces the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the operation id.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the operation id, if routed.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_parse() {
        let id = RequestId::new();
        assert_eq!(RequestId::parse(&id.to_string()), Some(id));
        assert_eq!(RequestId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_context_builders() {
        let id = RequestId::new();
        let ctx = RequestContext::new()
            .with_request_id(id)
            .with_operation_id("getBooks");

        assert_eq!(ctx.request_id(), id);
        assert_eq!(ctx.operation_id(), Some("getBooks"));
    }

    #[test]
    fn test_unrouted_context_has_no_operation() {
        assert!(RequestContext::default().operation_id().is_none());
    }
}
