//! The per-route action pipeline.
//!
//! An [`Action`] binds a request schema, a response schema and a
//! [`Service`]. Handling a request runs four stages:
//!
//! 1. [`Stage::ValidatingRequest`]: invalid parameters end with 422.
//! 2. [`Stage::InvokingService`]: a service error ends with its fault.
//! 3. [`Stage::ValidatingResponse`]: a value violating the response
//!    contract ends with a generic 500.
//! 4. [`Stage::Responding`]: the validated value is returned with 200.
//!
//! Any [`Fault`] is converted to a response by [`ActionResponse::from_fault`],
//! so no error escapes an action.
//!
//! # Example
//!
//! ```
//! use menagerie_core::{Action, Kind, RequestContext, Schema};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let action = Action::builder("getAllPets")
//!     .request(
//!         Schema::builder("GetAllPets")
//!             .required("page", Kind::Integer)
//!             .build()
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let params = json!({ "page": "abc" }).as_object().cloned().unwrap();
//! let response = action.handle(&RequestContext::new(), params).await;
//! assert_eq!(response.status().as_u16(), 422);
//! # });
//! ```

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use http::StatusCode;
use serde_json::Value;

use crate::fault::Fault;
use crate::schema::Schema;
use crate::service::{Params, Service, StubService};
use crate::validate::{validate_with, UnknownFieldsPolicy, ValidationResult};
use crate::RequestContext;

/// Pipeline stage of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Checking parameters against the request contract.
    ValidatingRequest,
    /// Waiting on the service.
    InvokingService,
    /// Checking the service value against the response contract.
    ValidatingResponse,
    /// Producing the response.
    Responding,
}

impl Stage {
    /// Returns the snake_case stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidatingRequest => "validating_request",
            Self::InvokingService => "invoking_service",
            Self::ValidatingResponse => "validating_response",
            Self::Responding => "responding",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and JSON body produced by an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    status: StatusCode,
    body: Value,
    fault: Option<&'static str>,
}

impl ActionResponse {
    /// A 200 response.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            fault: None,
        }
    }

    /// The response mapped from a fault.
    #[must_use]
    pub fn from_fault(fault: &Fault) -> Self {
        Self {
            status: fault.status_code(),
            body: fault.body(),
            fault: Some(fault.kind()),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the JSON body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the fault kind, if the action failed.
    #[must_use]
    pub fn fault(&self) -> Option<&'static str> {
        self.fault
    }

    /// Splits into status and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Value) {
        (self.status, self.body)
    }
}

impl From<Fault> for ActionResponse {
    fn from(fault: Fault) -> Self {
        Self::from_fault(&fault)
    }
}

/// A validated request/response pipeline for one operation.
#[derive(Clone)]
pub struct Action {
    operation_id: String,
    request: Schema,
    response: Schema,
    service: Arc<dyn Service>,
    path_bindings: Vec<String>,
    unknown_fields: UnknownFieldsPolicy,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("operation_id", &self.operation_id)
            .field("request", &self.request.name())
            .field("response", &self.response.name())
            .field("path_bindings", &self.path_bindings)
            .field("unknown_fields", &self.unknown_fields)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Creates a builder for the given operation.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> ActionBuilder {
        ActionBuilder::new(operation_id)
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the request contract.
    #[must_use]
    pub fn request_schema(&self) -> &Schema {
        &self.request
    }

    /// Returns the response contract.
    #[must_use]
    pub fn response_schema(&self) -> &Schema {
        &self.response
    }

    /// Request field names that path placeholders bind to, by position.
    #[must_use]
    pub fn path_bindings(&self) -> &[String] {
        &self.path_bindings
    }

    /// Returns the unknown-fields policy applied to requests.
    #[must_use]
    pub fn unknown_fields(&self) -> UnknownFieldsPolicy {
        self.unknown_fields
    }

    /// Runs the pipeline and maps any fault to its response.
    pub async fn handle(&self, ctx: &RequestContext, params: Params) -> ActionResponse {
        match self.run(ctx, params).await {
            Ok(body) => {
                tracing::debug!(
                    operation = %self.operation_id,
                    request_id = %ctx.request_id(),
                    stage = %Stage::Responding,
                    "Action completed"
                );
                ActionResponse::ok(body)
            }
            Err(fault) => {
                if fault.is_client_error() {
                    tracing::info!(
                        operation = %self.operation_id,
                        request_id = %ctx.request_id(),
                        fault = fault.kind(),
                        "Request rejected: {}",
                        fault
                    );
                } else {
                    tracing::error!(
                        operation = %self.operation_id,
                        request_id = %ctx.request_id(),
                        fault = fault.kind(),
                        "Action failed: {}",
                        fault
                    );
                }
                ActionResponse::from_fault(&fault)
            }
        }
    }

    /// Runs the pipeline, returning the validated response value or the
    /// fault that ended it.
    pub async fn run(&self, ctx: &RequestContext, params: Params) -> Result<Value, Fault> {
        self.trace(ctx, Stage::ValidatingRequest);
        let params = match validate_with(&self.request, &Value::Object(params), self.unknown_fields) {
            ValidationResult::Valid(params) => params,
            ValidationResult::Invalid(errors) => return Err(Fault::RequestValidation(errors)),
        };

        self.trace(ctx, Stage::InvokingService);
        let value = AssertUnwindSafe(self.service.call(ctx, params))
            .catch_unwind()
            .await
            .map_err(|panic| Fault::unexpected(panic_message(panic.as_ref())))??;

        // Extra keys in a service value are stripped, never reported.
        self.trace(ctx, Stage::ValidatingResponse);
        match validate_with(&self.response, &value, UnknownFieldsPolicy::Ignore) {
            ValidationResult::Valid(body) => Ok(Value::Object(body)),
            ValidationResult::Invalid(errors) => Err(Fault::ResponseShape(errors)),
        }
    }

    fn trace(&self, ctx: &RequestContext, stage: Stage) {
        tracing::trace!(
            operation = %self.operation_id,
            request_id = %ctx.request_id(),
            stage = %stage,
            "Entering stage"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("service panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("service panicked: {s}")
    } else {
        "service panicked".to_string()
    }
}

/// Builder for [`Action`].
pub struct ActionBuilder {
    operation_id: String,
    request: Option<Schema>,
    response: Option<Schema>,
    service: Arc<dyn Service>,
    path_bindings: Vec<String>,
    unknown_fields: UnknownFieldsPolicy,
}

impl ActionBuilder {
    /// Creates a builder. Contracts default to empty schemas and the
    /// service defaults to [`StubService`].
    #[must_use]
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            request: None,
            response: None,
            service: Arc::new(StubService),
            path_bindings: Vec::new(),
            unknown_fields: UnknownFieldsPolicy::default(),
        }
    }

    /// Sets the request contract.
    #[must_use]
    pub fn request(mut self, schema: Schema) -> Self {
        self.request = Some(schema);
        self
    }

    /// Sets the response contract.
    #[must_use]
    pub fn response(mut self, schema: Schema) -> Self {
        self.response = Some(schema);
        self
    }

    /// Sets the service.
    #[must_use]
    pub fn service(mut self, service: impl Service) -> Self {
        self.service = Arc::new(service);
        self
    }

    /// Sets a shared service.
    #[must_use]
    pub fn shared_service(mut self, service: Arc<dyn Service>) -> Self {
        self.service = service;
        self
    }

    /// Declares the request fields that path placeholders bind to, in
    /// placeholder order.
    #[must_use]
    pub fn bind_path<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_bindings = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the unknown-fields policy for request validation.
    #[must_use]
    pub fn unknown_fields(mut self, policy: UnknownFieldsPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Builds the action.
    #[must_use]
    pub fn build(self) -> Action {
        let request = self
            .request
            .unwrap_or_else(|| Schema::empty(format!("{}Request", self.operation_id)));
        let response = self
            .response
            .unwrap_or_else(|| Schema::empty(format!("{}Response", self.operation_id)));

        Action {
            operation_id: self.operation_id,
            request,
            response,
            service: self.service,
            path_bindings: self.path_bindings,
            unknown_fields: self.unknown_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::GENERIC_ERROR_MESSAGE;
    use crate::schema::Kind;
    use crate::service::{FnService, ServiceError};
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn pet_schema() -> Schema {
        Schema::builder("Pet")
            .optional("age", Kind::Integer)
            .optional("name", Kind::String)
            .build()
            .unwrap()
    }

    fn create_pet(service: impl Service) -> Action {
        Action::builder("createPet")
            .request(pet_schema())
            .response(pet_schema())
            .service(service)
            .build()
    }

    fn echo() -> impl Service {
        FnService::new(|_: RequestContext, params: Params| async move { Ok(Value::Object(params)) })
    }

    #[tokio::test]
    async fn test_success_preserves_schema_order() {
        let action = create_pet(echo());
        let response = action
            .handle(&RequestContext::new(), params(json!({ "name": "Rex", "age": 3 })))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().to_string(), r#"{"age":3,"name":"Rex"}"#);
        assert!(response.fault().is_none());
    }

    #[tokio::test]
    async fn test_request_validation_short_circuits() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let service = FnService::new(move |_: RequestContext, _: Params| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            async { Ok(json!({})) }
        });

        let response = create_pet(service)
            .handle(&RequestContext::new(), params(json!({ "age": "old" })))
            .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body(), &json!({ "errors": { "age": ["invalid type at age"] } }));
        assert_eq!(response.fault(), Some("request_validation"));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_service_failure_is_generic_500() {
        let service = FnService::new(|_: RequestContext, _: Params| async {
            Err(ServiceError::failure("connection refused"))
        });

        let response = create_pet(service).handle(&RequestContext::new(), Params::new()).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), &json!({ "error": GENERIC_ERROR_MESSAGE }));
        assert_eq!(response.fault(), Some("service_failure"));
    }

    #[tokio::test]
    async fn test_response_shape_fault() {
        let response_schema = Schema::builder("Book")
            .required("author", Kind::String)
            .required("title", Kind::String)
            .build()
            .unwrap();
        let action = Action::builder("getBookById")
            .response(response_schema)
            .service(FnService::new(|_: RequestContext, _: Params| async {
                Ok(json!({ "author": "Herbert" }))
            }))
            .build();

        let err = action
            .run(&RequestContext::new(), Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Fault::ResponseShape(ref e) if e.get("title").is_some()));

        let response = action.handle(&RequestContext::new(), Params::new()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), &json!({ "error": GENERIC_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_forbidden_and_not_found_from_service() {
        let forbidden = create_pet(FnService::new(|_: RequestContext, _: Params| async {
            Err(ServiceError::Forbidden("not your pet".into()))
        }));
        let response = forbidden.handle(&RequestContext::new(), Params::new()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body(), &json!({ "error": "Forbidden" }));

        let missing = create_pet(FnService::new(|_: RequestContext, _: Params| async {
            Err(ServiceError::NotFound("pet 9".into()))
        }));
        let response = missing.handle(&RequestContext::new(), Params::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), &json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn test_service_panic_becomes_500() {
        let service = FnService::new(|_: RequestContext, params: Params| async move {
            if params.is_empty() {
                panic!("index out of bounds");
            }
            Ok(json!({}))
        });

        let err = create_pet(service)
            .run(&RequestContext::new(), Params::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unexpected");
        assert!(err.to_string().contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_stub_service_with_empty_response_contract() {
        let action = Action::builder("getBooks").build();
        let response = action.handle(&RequestContext::new(), Params::new()).await;
        assert_eq!(response.into_parts(), (StatusCode::OK, json!({})));
    }

    #[tokio::test]
    async fn test_unknown_fields_reject_policy() {
        let action = Action::builder("createPet")
            .request(pet_schema())
            .unknown_fields(UnknownFieldsPolicy::Reject)
            .build();

        let response = action
            .handle(&RequestContext::new(), params(json!({ "name": "Rex", "color": "red" })))
            .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.body(),
            &json!({ "errors": { "color": ["unknown field color"] } })
        );
    }

    #[test]
    fn test_builder_defaults() {
        let action = Action::builder("getPetById").bind_path(["pet_id"]).build();
        assert_eq!(action.operation_id(), "getPetById");
        assert!(action.request_schema().is_empty());
        assert_eq!(action.path_bindings(), ["pet_id".to_string()]);
        assert_eq!(action.unknown_fields(), UnknownFieldsPolicy::Ignore);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::ValidatingRequest.to_string(), "validating_request");
        assert_eq!(Stage::Responding.as_str(), "responding");
    }
}
