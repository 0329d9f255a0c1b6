#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use recipebox_db::{CountStore, MemoryStore, RecipeStore};
use recipebox_events::{CountTrigger, EventBus};
use serde_json::{json, Value};
use tower::ServiceExt;

use recipebox_api::auth::{AuthConfig, TokenVerifier};
use recipebox_api::config::{ServerConfig, StoreBackend, SweepConfig};
use recipebox_api::router::build_app_router;
use recipebox_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-long-enough";
pub const COLLECTION: &str = "recipes";

/// Build a test `ServerConfig` with safe defaults and the in-memory backend.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        base_path: "/api".to_string(),
        recipe_collection: COLLECTION.to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            issuer: None,
            audience: None,
        },
        sweep: SweepConfig {
            enabled: false,
            timeout_secs: 300,
        },
    }
}

/// The router plus direct handles on the backing store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Build the full application router over a fresh [`MemoryStore`], with the
/// count trigger subscribed to the event bus.
///
/// Must be called inside a Tokio runtime.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let event_bus = Arc::new(EventBus::default());

    let trigger = CountTrigger::new(
        Arc::clone(&store) as Arc<dyn CountStore>,
        config.recipe_collection.clone(),
    );
    tokio::spawn(trigger.run(event_bus.subscribe()));

    let state = AppState {
        recipes: Arc::clone(&store) as Arc<dyn RecipeStore>,
        counts: Arc::clone(&store) as Arc<dyn CountStore>,
        verifier: Arc::new(TokenVerifier::new(&config.auth)),
        event_bus,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config)
            .expect("test config should build a router"),
        store,
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

fn token_with(secret: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": "cook-1",
        "email": "cook@example.com",
        "iat": now,
        "exp": now + exp_offset_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encoding should succeed")
}

/// A token the test app accepts.
pub fn valid_token() -> String {
    token_with(TEST_SECRET, 3600)
}

/// A token that expired well outside the verifier's leeway.
pub fn expired_token() -> String {
    token_with(TEST_SECRET, -3600)
}

/// A token signed with the wrong secret.
pub fn forged_token() -> String {
    token_with("not-the-test-secret", 3600)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send one request through the router.
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.router
        .clone()
        .oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("router is infallible")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A complete, valid recipe body.
pub fn recipe_body(name: &str, category: &str, serves: i64) -> Value {
    json!({
        "name": name,
        "category": category,
        "description": "A bright, sharp tart.",
        "serves": serves,
        "prepTime": "20m",
        "cookTime": "35m",
        "totalTime": "55m",
        "directions": ["Blind bake the shell", "Fill and bake"],
        "ingredients": ["lemons", "eggs", "sugar", "butter"],
        "publishDate": 1_700_000_000,
        "imageUrl": "https://images.example.com/tart.jpg",
    })
}

/// Create a recipe through the API and return its id.
pub async fn create(app: &TestApp, body: &Value) -> String {
    let response = send(app, Method::POST, "/api/recipes", Some(&valid_token()), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_text(response).await
}

/// Wait for the count trigger to bring the count to `expected`.
pub async fn wait_for_count(app: &TestApp, expected: i64) {
    for _ in 0..100 {
        if app.store.get_count(COLLECTION).await.unwrap_or(None) == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "count never reached {expected}, last value {:?}",
        app.store.get_count(COLLECTION).await
    );
}
