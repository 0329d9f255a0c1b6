//! Route definitions for the recipe collection.

use axum::routing::get;
use axum::Router;

use crate::handlers::recipes;
use crate::state::AppState;

/// Recipe routes mounted at `/recipes`.
///
/// ```text
/// GET    /          -> list_recipes
/// POST   /          -> create_recipe
/// GET    /{id}      -> get_recipe
/// PATCH  /{id}      -> patch_recipe
/// PUT    /{id}      -> replace_recipe
/// DELETE /{id}      -> delete_recipe
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/{id}",
            get(recipes::get_recipe)
                .patch(recipes::patch_recipe)
                .put(recipes::replace_recipe)
                .delete(recipes::delete_recipe),
        )
}
