//! Store traits shared by every backend.

use async_trait::async_trait;
use recipebox_core::query::RecipeQuery;
use recipebox_core::recipe::{NewRecipe, Recipe, RecipePatch};
use recipebox_core::types::DocId;

use crate::error::StoreError;

/// What a full replace did to the target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No document existed under the id; one was created.
    Created,
    /// An existing document was overwritten.
    Replaced,
}

/// CRUD and query access to the recipe collection.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Insert a new unpublished document and return its assigned id.
    async fn insert(&self, recipe: &NewRecipe) -> Result<DocId, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StoreError>;

    /// Execute a composed list query.
    ///
    /// A cursor naming a missing document yields
    /// [`StoreError::MissingDocument`].
    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, StoreError>;

    /// Merge the present fields of `patch` into an existing document.
    ///
    /// Returns `false` if no document has this id.
    async fn merge(&self, id: &str, patch: &RecipePatch) -> Result<bool, StoreError>;

    /// Overwrite (or create) the document under `id`. Resets `isPublished`.
    async fn replace(&self, id: &str, recipe: &NewRecipe) -> Result<WriteOutcome, StoreError>;

    /// Delete a document. Returns `false` if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Every document whose `isPublished` flag is `false`.
    async fn list_unpublished(&self) -> Result<Vec<Recipe>, StoreError>;

    /// Merge-write the `isPublished` flag of one document.
    async fn set_published(&self, id: &str, is_published: bool) -> Result<(), StoreError>;

    /// Confirm the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Access to the per-collection denormalized document counts.
#[async_trait]
pub trait CountStore: Send + Sync {
    /// Current count, or `None` if the count document was never created.
    async fn get_count(&self, collection: &str) -> Result<Option<i64>, StoreError>;

    /// Atomically add `delta` to an existing count, clamping at zero.
    ///
    /// Returns `false` if the count document does not exist.
    async fn increment_count(&self, collection: &str, delta: i64) -> Result<bool, StoreError>;

    /// Create or overwrite the count document.
    async fn set_count(&self, collection: &str, count: i64) -> Result<(), StoreError>;
}
