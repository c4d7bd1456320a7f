//! Pet services.

use async_trait::async_trait;
use serde_json::json;

use menagerie_core::{Params, RequestContext, Service, ServiceResult};

/// Lists pets, one page at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetAllPets;

#[async_trait]
impl Service for GetAllPets {
    async fn call(&self, ctx: &RequestContext, params: Params) -> ServiceResult {
        tracing::debug!(
            request_id = %ctx.request_id(),
            page = ?params.get("page"),
            "Listing pets"
        );
        Ok(json!({}))
    }
}

/// Creates a pet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatePet;

#[async_trait]
impl Service for CreatePet {
    async fn call(&self, ctx: &RequestContext, _params: Params) -> ServiceResult {
        tracing::debug!(request_id = %ctx.request_id(), "Creating pet");
        Ok(json!({}))
    }
}

/// Fetches one pet.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetPetById;

#[async_trait]
impl Service for GetPetById {
    async fn call(&self, ctx: &RequestContext, params: Params) -> ServiceResult {
        tracing::debug!(
            request_id = %ctx.request_id(),
            pet_id = ?params.get("pet_id"),
            "Fetching pet"
        );
        Ok(json!({}))
    }
}
