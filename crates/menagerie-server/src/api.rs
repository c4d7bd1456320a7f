//! Route table and in-memory request handling.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Request, Response};
use http_body_util::Full;
use menagerie_core::{Action, ActionResponse, Fault, RequestContext, RequestId};
use menagerie_router::{placeholders, Router};
use menagerie_telemetry::metrics::{record_fault, record_request, InFlightGuard};

use crate::error::ServerError;
use crate::params::merge_params;

/// Header carrying the request id on every response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Operation label for requests that matched no route.
const UNMATCHED: &str = "unmatched";

/// HTTP response type produced by [`Api::handle`].
pub type HttpResponse = Response<Full<Bytes>>;

/// The route table of an application.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use http::{Method, Request, StatusCode};
/// use menagerie_core::Action;
/// use menagerie_server::Api;
///
/// # tokio_test::block_on(async {
/// let api = Api::builder()
///     .route(Method::GET, "/books", Action::builder("getBooks").build())
///     .unwrap()
///     .build();
///
/// let req = Request::get("/books").body(Bytes::new()).unwrap();
/// let res = api.handle(req).await;
/// assert_eq!(res.status(), StatusCode::OK);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Api {
    router: Arc<Router<Arc<Action>>>,
    mount_path: String,
}

impl Api {
    /// Starts building an API.
    #[must_use]
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    /// Returns the mount prefix, empty when unmounted.
    #[must_use]
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Lists registered routes as `(method, pattern)`.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.router.routes()
    }

    /// Handles one request entirely in memory.
    pub async fn handle(&self, req: Request<Bytes>) -> HttpResponse {
        let _in_flight = InFlightGuard::new();

        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();
        let ctx = RequestContext::new().with_request_id(request_id);

        let (parts, body) = req.into_parts();
        let method = parts.method;
        let path = parts.uri.path();

        let (operation, response) = self
            .dispatch(&method, path, parts.uri.query(), &body, ctx.clone())
            .await
            .unwrap_or_else(|| {
                let fault = Fault::not_found(path.to_string());
                (UNMATCHED.to_string(), ActionResponse::from(fault))
            });

        let elapsed = ctx.elapsed();
        record_request(&operation, response.status().as_u16(), elapsed);
        if let Some(kind) = response.fault() {
            record_fault(&operation, kind);
        }

        tracing::info!(
            request_id = %request_id,
            operation_id = %operation,
            http.method = %method,
            http.path = %path,
            http.status_code = response.status().as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            fault = response.fault(),
            "Request completed"
        );

        render(request_id, response)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        body: &[u8],
        ctx: RequestContext,
    ) -> Option<(String, ActionResponse)> {
        let path = self.strip_mount(path)?;
        let route = self.router.match_route(method, path)?;
        let action = route.handler;
        let ctx = ctx.with_operation_id(action.operation_id());

        // Placeholders the request contract does not declare only route.
        let request = action.request_schema();
        let bound = route
            .params
            .bind(action.path_bindings())
            .filter(|(name, _)| request.field(name).is_some());

        let response = match merge_params(body, query, bound) {
            Ok(params) => action.handle(&ctx, params).await,
            Err(fault) => {
                tracing::info!(
                    operation = %action.operation_id(),
                    request_id = %ctx.request_id(),
                    fault = fault.kind(),
                    "Request rejected: {}",
                    fault
                );
                ActionResponse::from(fault)
            }
        };

        Some((action.operation_id().to_string(), response))
    }

    fn strip_mount<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.mount_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(self.mount_path.as_str())? {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

/// Renders a fault raised before a request reaches the [`Api`].
pub(crate) fn fault_response(fault: &Fault) -> HttpResponse {
    render(RequestId::new(), ActionResponse::from_fault(fault))
}

fn render(request_id: RequestId, response: ActionResponse) -> HttpResponse {
    let (status, body) = response.into_parts();
    let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| b"{}".to_vec());

    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    *res.status_mut() = status;
    let headers = res.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Builder for [`Api`].
#[derive(Debug, Default)]
pub struct ApiBuilder {
    router: Router<Arc<Action>>,
    mount_path: String,
}

impl ApiBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves every route under a prefix such as `/api`.
    pub fn mount_path(mut self, prefix: impl Into<String>) -> Result<Self, ServerError> {
        let prefix = prefix.into();
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(ServerError::InvalidMountPath(prefix));
        }
        self.mount_path = prefix;
        Ok(self)
    }

    /// Registers an action for a method and pattern.
    ///
    /// # Errors
    ///
    /// Fails on an invalid or duplicate pattern, or when the action binds
    /// a different number of path fields than the pattern has placeholders.
    pub fn route(self, method: Method, pattern: &str, action: Action) -> Result<Self, ServerError> {
        self.shared_route(method, pattern, Arc::new(action))
    }

    /// Registers an action that is shared with other routes.
    pub fn shared_route(
        mut self,
        method: Method,
        pattern: &str,
        action: Arc<Action>,
    ) -> Result<Self, ServerError> {
        let names = placeholders(pattern)?;
        let bound = action.path_bindings().len();
        if bound != 0 && bound != names.len() {
            return Err(ServerError::PathBinding {
                operation: action.operation_id().to_string(),
                pattern: pattern.to_string(),
                bound,
                placeholders: names.len(),
            });
        }

        tracing::debug!(%method, pattern, operation = %action.operation_id(), "Route registered");
        self.router.insert(method, pattern, action)?;
        Ok(self)
    }

    /// Finishes the API.
    #[must_use]
    pub fn build(self) -> Api {
        Api {
            router: Arc::new(self.router),
            mount_path: self.mount_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use menagerie_core::{FnService, Kind, Params, Schema, ServiceError};
    use menagerie_router::RouteError;
    use serde_json::{json, Value};

    async fn body_json(res: HttpResponse) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_pet() -> Action {
        let request = Schema::builder("GetPetRequest")
            .required("pet_id", Kind::Integer)
            .build()
            .unwrap();
        let response = Schema::builder("Pet")
            .optional("id", Kind::Integer)
            .required("name", Kind::String)
            .build()
            .unwrap();

        Action::builder("getPetById")
            .request(request)
            .response(response)
            .bind_path(["pet_id"])
            .service(FnService::new(|_: RequestContext, params: Params| async move {
                match params["pet_id"].as_i64() {
                    Some(404) => Err(ServiceError::NotFound("pet".to_string())),
                    id => Ok(json!({ "id": id, "name": "Fido" })),
                }
            }))
            .build()
    }

    fn api() -> Api {
        Api::builder()
            .route(Method::GET, "/pets/:petId", get_pet())
            .unwrap()
            .route(Method::GET, "/books/:bookId", Action::builder("getBookById").build())
            .unwrap()
            .build()
    }

    fn request(method: Method, uri: &str, body: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_path_param_bound_and_coerced() {
        let res = api().handle(request(Method::GET, "/pets/7", "")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(body_json(res).await, json!({ "id": 7, "name": "Fido" }));
    }

    #[tokio::test]
    async fn test_invalid_path_param() {
        let res = api().handle(request(Method::GET, "/pets/rex", "")).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(res).await,
            json!({ "errors": { "pet_id": ["invalid type at pet_id"] } })
        );
    }

    #[tokio::test]
    async fn test_service_not_found() {
        let res = api().handle(request(Method::GET, "/pets/404", "")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await, json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn test_unmatched_route() {
        let res = api().handle(request(Method::DELETE, "/pets/7", "")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));

        let res = api().handle(request(Method::GET, "/owners", "")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_undeclared_placeholder_not_passed() {
        let api = Api::builder()
            .route(
                Method::GET,
                "/books/:bookId",
                Action::builder("getBookById")
                    .unknown_fields(menagerie_core::UnknownFieldsPolicy::Reject)
                    .build(),
            )
            .unwrap()
            .build();

        let res = api.handle(request(Method::GET, "/books/dune", "")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!({}));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let res = api().handle(request(Method::GET, "/pets/7", "[1]")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await, json!({ "error": "Malformed request body" }));
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let id = RequestId::new();
        let req = Request::builder()
            .uri("/pets/7")
            .header(REQUEST_ID_HEADER, id.to_string())
            .body(Bytes::new())
            .unwrap();

        let res = api().handle(req).await;
        assert_eq!(res.headers()[REQUEST_ID_HEADER], id.to_string().as_str());
    }

    #[tokio::test]
    async fn test_mount_path() {
        let api = Api::builder()
            .mount_path("/api")
            .unwrap()
            .route(Method::GET, "/pets/:petId", get_pet())
            .unwrap()
            .build();

        let res = api.handle(request(Method::GET, "/api/pets/7", "")).await;
        assert_eq!(res.status(), StatusCode::OK);

        for uri in ["/pets/7", "/apipets/7"] {
            let res = api.handle(request(Method::GET, uri, "")).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[test]
    fn test_invalid_mount_path() {
        for prefix in ["api", "/api/"] {
            assert!(matches!(
                Api::builder().mount_path(prefix),
                Err(ServerError::InvalidMountPath(_))
            ));
        }
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = Api::builder()
            .route(Method::GET, "/pets/:petId", get_pet())
            .unwrap()
            .route(Method::GET, "/pets/:id", get_pet())
            .unwrap_err();
        assert!(matches!(err, ServerError::Route(RouteError::Duplicate { .. })));
    }

    #[test]
    fn test_path_binding_count_checked() {
        let err = Api::builder()
            .route(Method::GET, "/pets", get_pet())
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::PathBinding { bound: 1, placeholders: 0, .. }
        ));
    }

    #[test]
    fn test_routes_listed() {
        let routes: Vec<_> = api().routes().map(|(m, p)| (m.clone(), p.to_string())).collect();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0], (Method::GET, "/pets/:petId".to_string()));
    }
}
