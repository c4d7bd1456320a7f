//! Service trait for business logic.
//!
//! A [`Service`] is the opaque capability an action invokes with validated
//! request parameters. It answers with a [`ServiceResult`]: `Ok` carries the
//! success value, `Err` carries a [`ServiceError`].
//!
//! Deeper layers (authorization, lookups) surface their faults through the
//! same error type, so a service is the single channel through which they
//! reach the action.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::RequestContext;

/// Parameter mapping handed to a service.
pub type Params = Map<String, Value>;

/// Result of one service invocation.
pub type ServiceResult<T = Value> = Result<T, ServiceError>;

/// Failure returned by a service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation failed. The reason is logged but never returned to
    /// the client.
    #[error("{0}")]
    Failure(String),

    /// The caller may not perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other error.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    /// Creates a [`ServiceError::Failure`].
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }
}

/// Business logic invoked by an action.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use menagerie_core::{Params, RequestContext, Service, ServiceResult};
/// use serde_json::json;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Service for Echo {
///     async fn call(&self, _ctx: &RequestContext, params: Params) -> ServiceResult {
///         Ok(json!(params))
///     }
/// }
/// ```
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Runs the service with validated parameters.
    async fn call(&self, ctx: &RequestContext, params: Params) -> ServiceResult;
}

/// A service that always succeeds with an empty mapping.
///
/// Bound to every operation until a real implementation replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubService;

#[async_trait]
impl Service for StubService {
    async fn call(&self, _ctx: &RequestContext, _params: Params) -> ServiceResult {
        Ok(Value::Object(Map::new()))
    }
}

/// Adapts an async function into a [`Service`].
///
/// # Example
///
/// ```
/// use menagerie_core::{FnService, Params, RequestContext, ServiceResult};
/// use serde_json::json;
///
/// let service = FnService::new(|_ctx: RequestContext, params: Params| async move {
///     ServiceResult::Ok(json!({ "name": params.get("name").cloned() }))
/// });
/// ```
pub struct FnService<F, Fut>
where
    F: Fn(RequestContext, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult> + Send + 'static,
{
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnService<F, Fut>
where
    F: Fn(RequestContext, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult> + Send + 'static,
{
    /// Wraps `func`.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> Service for FnService<F, Fut>
where
    F: Fn(RequestContext, Params) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult> + Send + 'static,
{
    async fn call(&self, ctx: &RequestContext, params: Params) -> ServiceResult {
        (self.func)(ctx.clone(), params).await
    }
}
