//! End-to-end tests driving the assembled API in memory.

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};

use menagerie::{build_api, Services};
use menagerie_config::{MenagerieConfig, UnknownFieldsPolicy};
use menagerie_core::{FnService, Params, RequestContext, ServiceError, GENERIC_ERROR_MESSAGE};
use menagerie_server::{Api, HttpResponse, REQUEST_ID_HEADER};

fn api(services: Services) -> Api {
    build_api(&MenagerieConfig::default(), services).unwrap()
}

async fn send(api: &Api, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::from(body.to_string()))
        .unwrap();
    read(api.handle(req).await).await
}

async fn read(res: HttpResponse) -> (StatusCode, Value) {
    let status = res.status();
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn book_missing_title_is_generic_500() {
    let services = Services::default().get_book_by_id(FnService::new(
        |_: RequestContext, _: Params| async {
            Ok(json!({ "author": "Frank Herbert", "reviews": [] }))
        },
    ));

    let (status, body) = send(&api(services), Method::GET, "/books/dune", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": GENERIC_ERROR_MESSAGE }));
}

#[tokio::test]
async fn default_book_service_fails_response_contract() {
    let (status, _) = send(&api(Services::default()), Method::GET, "/books/1", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_integer_page_is_422() {
    let (status, body) = send(&api(Services::default()), Method::GET, "/pets?page=abc", "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "errors": { "page": ["invalid type at page"] } }));
}

#[tokio::test]
async fn missing_page_is_422() {
    let (status, body) = send(&api(Services::default()), Method::GET, "/pets", "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "errors": { "page": ["missing required field page"] } }));
}

#[tokio::test]
async fn numeric_page_reaches_service_as_integer() {
    let services = Services::default().get_all_pets(FnService::new(
        |_: RequestContext, params: Params| async move {
            assert_eq!(params["page"], json!(2));
            Ok(json!({ "name": "Rex", "owner": "ignored" }))
        },
    ));

    let (status, body) = send(&api(services), Method::GET, "/pets?page=2&q=rex", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Rex" }));
}

#[tokio::test]
async fn create_pet_echoes_in_declared_order() {
    let services = Services::default().create_pet(FnService::new(
        |_: RequestContext, params: Params| async move { Ok(Value::Object(params)) },
    ));

    let req = Request::post("/pets")
        .body(Bytes::from_static(br#"{"name":"Rex","age":3}"#))
        .unwrap();
    let res = api(services).handle(req).await;
    let bytes = res.into_body().collect().await.unwrap().to_bytes();

    assert_eq!(&bytes[..], br#"{"age":3,"name":"Rex"}"#);
}

#[tokio::test]
async fn get_pet_by_id_binds_path() {
    let services = Services::default().get_pet_by_id(FnService::new(
        |_: RequestContext, params: Params| async move {
            assert_eq!(params["pet_id"], json!(7));
            Ok(json!({ "name": "Fido" }))
        },
    ));

    let (status, body) = send(&api(services), Method::GET, "/pets/7", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Fido" }));
}

#[tokio::test]
async fn percent_encoded_path_value_is_decoded() {
    let services = Services::default().get_pet_by_id(FnService::new(
        |_: RequestContext, params: Params| async move {
            assert_eq!(params["pet_id"], json!(7));
            Ok(json!({ "name": "Fido" }))
        },
    ));

    let (status, _) = send(&api(services), Method::GET, "/pets/%37", "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn service_failure_is_generic_500() {
    let services = Services::default().get_pet_by_id(FnService::new(
        |_: RequestContext, _: Params| async { Err(ServiceError::failure("db offline")) },
    ));

    let (status, body) = send(&api(services), Method::GET, "/pets/7", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("db offline"));
}

#[tokio::test]
async fn forbidden_and_not_found_from_service() {
    let services = Services::default()
        .get_pet_by_id(FnService::new(|_: RequestContext, _: Params| async {
            Err(ServiceError::NotFound("pet 7".to_string()))
        }))
        .create_pet(FnService::new(|_: RequestContext, _: Params| async {
            Err(ServiceError::Forbidden("read-only".to_string()))
        }));
    let api = api(services);

    let (status, body) = send(&api, Method::GET, "/pets/7", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let (status, body) = send(&api, Method::POST, "/pets", "{}").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Forbidden" }));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, body) = send(&api(Services::default()), Method::GET, "/owners", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, body) = send(&api(Services::default()), Method::POST, "/pets", "{oops").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Malformed request body" }));
}

#[tokio::test]
async fn undecodable_query_is_400() {
    let (status, body) = send(&api(Services::default()), Method::GET, "/pets?page=%FF", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Malformed query string" }));
}

#[tokio::test]
async fn reject_policy_reports_unknown_fields() {
    let mut config = MenagerieConfig::default();
    config.contract.unknown_fields = UnknownFieldsPolicy::Reject;
    let services = Services::default().get_pet_by_id(FnService::new(
        |_: RequestContext, _: Params| async { Ok(json!({ "name": "Fido", "tail": true })) },
    ));
    let api = build_api(&config, services).unwrap();

    let (status, body) = send(&api, Method::POST, "/pets", r#"{"name":"Rex","tail":true}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "errors": { "tail": ["unknown field tail"] } }));

    // Path placeholders are declared fields, and responses are never
    // rejected for extra keys.
    let (status, body) = send(&api, Method::GET, "/pets/7", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Fido" }));
}

#[tokio::test]
async fn mount_path_prefixes_routes() {
    let mut config = MenagerieConfig::default();
    config.server.mount_path = "/api".to_string();
    let api = build_api(&config, Services::default()).unwrap();

    let (status, _) = send(&api, Method::POST, "/api/pets", "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&api, Method::POST, "/pets", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test]
fn duplicate_route_rejected_at_startup() {
    use menagerie_core::Action;
    use menagerie_router::RouteError;
    use menagerie_server::ServerError;

    let err = Api::builder()
        .route(Method::GET, "/pets/:petId", Action::builder("getPetById").build())
        .unwrap()
        .route(Method::GET, "/pets/:id", Action::builder("again").build())
        .unwrap_err();
    assert!(matches!(err, ServerError::Route(RouteError::Duplicate { .. })));
}

#[test]
fn same_shape_under_another_method_registers() {
    use menagerie_core::Action;

    let api = Api::builder()
        .route(Method::GET, "/pets/:petId", Action::builder("getPetById").build())
        .unwrap()
        .route(Method::DELETE, "/pets/:id", Action::builder("deletePet").build());
    assert!(api.is_ok());
}
