//! Book services.

use async_trait::async_trait;
use serde_json::json;

use menagerie_core::{Params, RequestContext, Service, ServiceResult};

/// Lists books.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetBooks;

#[async_trait]
impl Service for GetBooks {
    async fn call(&self, ctx: &RequestContext, _params: Params) -> ServiceResult {
        tracing::debug!(request_id = %ctx.request_id(), "Listing books");
        Ok(json!({}))
    }
}

/// Fetches one book.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetBookById;

#[async_trait]
impl Service for GetBookById {
    async fn call(&self, ctx: &RequestContext, _params: Params) -> ServiceResult {
        tracing::debug!(request_id = %ctx.request_id(), "Fetching book");
        Ok(json!({}))
    }
}
