//! Handlers for the recipe collection.
//!
//! Writes require an [`AuthUser`]; reads do not. Listing is open to
//! everyone, but anonymous callers only see published recipes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use recipebox_core::error::CoreError;
use recipebox_core::query::{ListRecipesParams, RecipeQuery};
use recipebox_core::recipe::{
    sanitize_recipe, sanitize_recipe_patch, validate_recipe, NewRecipe, Recipe, RECIPE_ENTITY,
};
use recipebox_db::{StoreError, WriteOutcome};
use recipebox_events::RecipeEvent;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, Viewer};
use crate::state::AppState;

/// Response body of `GET /recipes`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListResponse {
    /// Collection-wide count from the count document, not the page size.
    pub collection_document_count: i64,
    pub documents: Vec<Recipe>,
}

/// Validate and sanitize a full create/replace body.
fn full_recipe(payload: Result<Json<Value>, JsonRejection>) -> AppResult<NewRecipe> {
    let Json(payload) = payload?;
    if !validate_recipe(&payload) {
        return Err(AppError::invalid_recipe());
    }
    sanitize_recipe(&payload).map_err(|e| {
        tracing::debug!(error = %e, "Recipe payload has unusable field types");
        AppError::invalid_recipe()
    })
}

/// POST /recipes
///
/// Create an unpublished recipe. Responds 201 with the new id as the body.
pub async fn create_recipe(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let recipe = full_recipe(payload)?;
    let id = state.recipes.insert(&recipe).await?;

    state.event_bus.publish(RecipeEvent::created(id.clone()));
    tracing::info!(recipe_id = %id, user_id = %auth.user_id, "Recipe created");

    Ok((StatusCode::CREATED, id))
}

/// GET /recipes
///
/// List recipes with optional filters, ordering and pagination.
pub async fn list_recipes(
    viewer: Viewer,
    State(state): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> AppResult<impl IntoResponse> {
    let query = RecipeQuery::compose(&params, viewer.visibility())?;
    let documents = state.recipes.list(&query).await?;
    let collection_document_count = state
        .counts
        .get_count(&state.config.recipe_collection)
        .await?
        .unwrap_or(0);

    Ok(Json(RecipeListResponse {
        collection_document_count,
        documents,
    }))
}

/// GET /recipes/{id}
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = state
        .recipes
        .find_by_id(&id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: RECIPE_ENTITY,
            id,
        }))?;

    Ok(Json(recipe))
}

/// PATCH /recipes/{id}
///
/// Merge the truthy allowed fields of the body into an existing recipe.
/// Patching a missing recipe is a store error (400).
pub async fn patch_recipe(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let patch = sanitize_recipe_patch(&payload)?;

    if !state.recipes.merge(&id, &patch).await? {
        return Err(StoreError::MissingDocument { id }.into());
    }

    tracing::info!(recipe_id = %id, user_id = %auth.user_id, "Recipe patched");
    Ok(StatusCode::OK)
}

/// PUT /recipes/{id}
///
/// Overwrite a recipe with a full body. A missing id is created.
pub async fn replace_recipe(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let recipe = full_recipe(payload)?;

    match state.recipes.replace(&id, &recipe).await? {
        WriteOutcome::Created => {
            state.event_bus.publish(RecipeEvent::created(id.clone()));
            tracing::info!(recipe_id = %id, user_id = %auth.user_id, "Recipe created by replace");
        }
        WriteOutcome::Replaced => {
            tracing::info!(recipe_id = %id, user_id = %auth.user_id, "Recipe replaced");
        }
    }

    Ok(StatusCode::OK)
}

/// DELETE /recipes/{id}
///
/// Deleting a missing recipe succeeds without firing the delete trigger.
pub async fn delete_recipe(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if state.recipes.delete(&id).await? {
        state.event_bus.publish(RecipeEvent::deleted(id.clone()));
        tracing::info!(recipe_id = %id, user_id = %auth.user_id, "Recipe deleted");
    } else {
        tracing::debug!(recipe_id = %id, "Delete of missing recipe");
    }

    Ok(StatusCode::OK)
}
