//! Route registration.

use std::sync::Arc;

use http::Method;
use thiserror::Error;

use menagerie_config::MenagerieConfig;
use menagerie_core::{Action, ActionBuilder, SchemaError, Service, UnknownFieldsPolicy};
use menagerie_server::{Api, ServerError};

use crate::contracts::Contract;
use crate::services;

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// A contract schema is invalid.
    #[error("invalid contract: {0}")]
    Schema(#[from] SchemaError),

    /// A route could not be registered.
    #[error("invalid route table: {0}")]
    Server(#[from] ServerError),
}

/// The service bound to each operation.
///
/// # Example
///
/// ```
/// use menagerie::Services;
/// use menagerie_core::{FnService, Params, RequestContext, ServiceResult};
/// use serde_json::json;
///
/// let services = Services::default().get_pet_by_id(FnService::new(
///     |_: RequestContext, _: Params| async { ServiceResult::Ok(json!({ "name": "Fido" })) },
/// ));
/// ```
#[derive(Clone)]
pub struct Services {
    get_books: Arc<dyn Service>,
    get_book_by_id: Arc<dyn Service>,
    get_all_pets: Arc<dyn Service>,
    create_pet: Arc<dyn Service>,
    get_pet_by_id: Arc<dyn Service>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            get_books: Arc::new(services::GetBooks),
            get_book_by_id: Arc::new(services::GetBookById),
            get_all_pets: Arc::new(services::GetAllPets),
            create_pet: Arc::new(services::CreatePet),
            get_pet_by_id: Arc::new(services::GetPetById),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    /// Binds `getBooks`.
    pub fn get_books(mut self, service: impl Service) -> Self {
        self.get_books = Arc::new(service);
        self
    }

    /// Binds `getBookById`.
    pub fn get_book_by_id(mut self, service: impl Service) -> Self {
        self.get_book_by_id = Arc::new(service);
        self
    }

    /// Binds `getAllPets`.
    pub fn get_all_pets(mut self, service: impl Service) -> Self {
        self.get_all_pets = Arc::new(service);
        self
    }

    /// Binds `createPet`.
    pub fn create_pet(mut self, service: impl Service) -> Self {
        self.create_pet = Arc::new(service);
        self
    }

    /// Binds `getPetById`.
    pub fn get_pet_by_id(mut self, service: impl Service) -> Self {
        self.get_pet_by_id = Arc::new(service);
        self
    }
}

/// Builds the books and pets API.
///
/// | Method | Path | Operation |
/// |---|---|---|
/// | GET | `/books` | `getBooks` |
/// | GET | `/books/:bookId` | `getBookById` |
/// | GET | `/pets` | `getAllPets` |
/// | POST | `/pets` | `createPet` |
/// | GET | `/pets/:petId` | `getPetById` |
pub fn build_api(config: &MenagerieConfig, services: Services) -> Result<Api, AppError> {
    let policy = config.contract.unknown_fields;
    let action = |operation_id: &str, contract: Contract, service: Arc<dyn Service>| {
        action_builder(operation_id, contract, service, policy)
    };

    let api = Api::builder()
        .mount_path(config.server.mount_path.clone())?
        .route(
            Method::GET,
            "/books",
            action("getBooks", Contract::get_books()?, services.get_books).build(),
        )?
        .route(
            Method::GET,
            "/books/:bookId",
            action("getBookById", Contract::get_book_by_id()?, services.get_book_by_id).build(),
        )?
        .route(
            Method::GET,
            "/pets",
            action("getAllPets", Contract::get_all_pets()?, services.get_all_pets).build(),
        )?
        .route(
            Method::POST,
            "/pets",
            action("createPet", Contract::create_pet()?, services.create_pet).build(),
        )?
        .route(
            Method::GET,
            "/pets/:petId",
            action("getPetById", Contract::get_pet_by_id()?, services.get_pet_by_id)
                .bind_path(["pet_id"])
                .build(),
        )?
        .build();

    tracing::info!(
        routes = api.routes().count(),
        mount_path = api.mount_path(),
        unknown_fields = ?policy,
        "API assembled"
    );
    Ok(api)
}

fn action_builder(
    operation_id: &str,
    contract: Contract,
    service: Arc<dyn Service>,
    policy: UnknownFieldsPolicy,
) -> ActionBuilder {
    Action::builder(operation_id)
        .request(contract.request)
        .response(contract.response)
        .shared_service(service)
        .unknown_fields(policy)
}
