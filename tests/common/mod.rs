#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, App};
use chrono::Duration;
use serde_json::{json, Value};

use todoforge::auth::{PasswordHasher, TokenService};
use todoforge::routes::{self, health};
use todoforge::store::MemoryStore;
use todoforge::AppState;

pub const TEST_SECRET: &[u8] = b"integration_test_secret";

pub fn token_service() -> TokenService {
    TokenService::new(TEST_SECRET, Duration::minutes(30))
}

/// Fresh in-memory state with a cheap bcrypt cost.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(MemoryStore::new()),
        token_service(),
        PasswordHasher::new(4),
    )
}

/// The application as `main` assembles it, minus CORS.
pub fn test_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .configure(move |cfg| state.configure(cfg))
        .wrap(Logger::default())
        .service(health::health)
        .configure(routes::config)
}

/// Sends `req` and returns the status with the JSON body (`Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            panic!(
                "non-JSON body ({}): {}",
                e,
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    (status, body)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers `username` and returns a bearer token for it.
pub async fn register_and_login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
) -> String {
    let password = "password123";
    let (status, body) = register(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);

    let (status, body) = login(app, username, password).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_string()
}

/// Creates a list as the holder of `token` and returns its JSON.
pub async fn create_todo(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    title: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/todo")
        .insert_header(bearer(token))
        .set_json(json!({ "title": title }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "create todo failed: {}", body);
    body
}

/// Creates a task as the holder of `token` and returns its JSON.
pub async fn create_task(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    list_id: i64,
    note: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/task")
        .insert_header(bearer(token))
        .set_json(json!({ "todo_list": list_id, "note": note }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
    body
}
