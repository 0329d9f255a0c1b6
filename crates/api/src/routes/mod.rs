pub mod health;
pub mod recipes;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree, nested under the configured base path.
///
/// Route hierarchy:
///
/// ```text
/// /recipes                   list, create
/// /recipes/{id}              get, patch, replace, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/recipes", recipes::router())
}
