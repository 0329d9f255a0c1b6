//! HTTP surface of the recipe service.
//!
//! `main.rs` and the integration tests both go through [`build_app_router`],
//! so a request in a test passes the same layers as one in production.

use std::time::Duration;

use axum::http::header::{InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Methods the recipe routes answer to.
const RECIPE_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Assemble routes and middleware for `config`.
///
/// Fails if a configured CORS origin is not a valid header value.
///
/// Layers, outermost first: CORS, request-id assignment, tracing, request-id
/// echo, timeout, panic recovery.
pub fn build_app_router(
    state: AppState,
    config: &ServerConfig,
) -> Result<Router, InvalidHeaderValue> {
    let middleware = ServiceBuilder::new()
        .layer(cors_layer(&config.cors_origins)?)
        .map_response(|res: axum::http::Response<_>| res.map(axum::body::Body::new))
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::new());

    Ok(mount_routes(&config.base_path).layer(middleware).with_state(state))
}

/// `/health` stays at the root; recipe routes go under `base_path`.
fn mount_routes(base_path: &str) -> Router<AppState> {
    let root = Router::new().merge(routes::health::router());
    match base_path {
        "" => root.merge(routes::api_routes()),
        prefix => root.nest(prefix, routes::api_routes()),
    }
}

/// CORS policy for browser clients on `origins`.
///
/// Credentials are allowed so the `Authorization` header survives preflight.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(RECIPE_METHODS)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60)))
}
