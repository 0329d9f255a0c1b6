//! PostgreSQL-backed store.

use async_trait::async_trait;
use recipebox_core::query::RecipeQuery;
use recipebox_core::recipe::{NewRecipe, Recipe, RecipePatch};
use recipebox_core::types::{new_doc_id, DocId};

use crate::error::StoreError;
use crate::repositories::{DocumentCountRepo, RecipeRepo};
use crate::store::{CountStore, RecipeStore, WriteOutcome};
use crate::DbPool;

/// [`RecipeStore`] and [`CountStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<DocId, StoreError> {
        let id = new_doc_id();
        RecipeRepo::insert(&self.pool, &id, recipe).await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(RecipeRepo::find_by_id(&self.pool, id).await?.map(Recipe::from))
    }

    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, StoreError> {
        if let Some(cursor) = query.cursor() {
            if !RecipeRepo::exists(&self.pool, cursor).await? {
                tracing::debug!(cursor, "List cursor names a missing document");
                return Err(StoreError::MissingDocument {
                    id: cursor.to_string(),
                });
            }
        }

        let rows = RecipeRepo::list(&self.pool, query).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn merge(&self, id: &str, patch: &RecipePatch) -> Result<bool, StoreError> {
        Ok(RecipeRepo::merge(&self.pool, id, patch).await?)
    }

    async fn replace(&self, id: &str, recipe: &NewRecipe) -> Result<WriteOutcome, StoreError> {
        Ok(RecipeRepo::upsert(&self.pool, id, recipe).await?)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(RecipeRepo::delete(&self.pool, id).await?)
    }

    async fn list_unpublished(&self) -> Result<Vec<Recipe>, StoreError> {
        let rows = RecipeRepo::list_unpublished(&self.pool).await?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn set_published(&self, id: &str, is_published: bool) -> Result<(), StoreError> {
        Ok(RecipeRepo::set_published(&self.pool, id, is_published).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl CountStore for PgStore {
    async fn get_count(&self, collection: &str) -> Result<Option<i64>, StoreError> {
        Ok(DocumentCountRepo::find(&self.pool, collection)
            .await?
            .map(|row| row.count))
    }

    async fn increment_count(&self, collection: &str, delta: i64) -> Result<bool, StoreError> {
        Ok(DocumentCountRepo::increment(&self.pool, collection, delta).await?)
    }

    async fn set_count(&self, collection: &str, count: i64) -> Result<(), StoreError> {
        Ok(DocumentCountRepo::upsert(&self.pool, collection, count).await?)
    }
}
