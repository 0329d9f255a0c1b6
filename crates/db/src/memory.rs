//! Process-local store with the same query semantics as [`PgStore`](crate::PgStore).
//!
//! Backs the API integration tests and `STORE_BACKEND=memory` runs. Data is
//! lost when the process exits.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use recipebox_core::query::{PageStart, RecipeQuery};
use recipebox_core::recipe::{NewRecipe, Recipe, RecipePatch};
use recipebox_core::types::{new_doc_id, DocId};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{CountStore, RecipeStore, WriteOutcome};

#[derive(Default)]
pub struct MemoryStore {
    recipes: RwLock<BTreeMap<DocId, Recipe>>,
    counts: RwLock<HashMap<String, i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert(&self, recipe: &NewRecipe) -> Result<DocId, StoreError> {
        let id = new_doc_id();
        self.recipes
            .write()
            .await
            .insert(id.clone(), recipe.clone().into_recipe(id.clone()));
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().await.get(id).cloned())
    }

    async fn list(&self, query: &RecipeQuery) -> Result<Vec<Recipe>, StoreError> {
        let recipes = self.recipes.read().await;

        let cursor = match query.cursor() {
            Some(id) => Some(recipes.get(id).ok_or_else(|| StoreError::MissingDocument {
                id: id.to_string(),
            })?),
            None => None,
        };

        let mut matched: Vec<&Recipe> = recipes
            .values()
            .filter(|r| query.matches(r))
            .filter(|r| cursor.map_or(true, |c| query.compare(r, c) == Ordering::Greater))
            .collect();
        matched.sort_by(|a, b| query.compare(a, b));

        let offset = match &query.start {
            Some(PageStart::Offset(n)) => usize::try_from(*n).unwrap_or(0),
            _ => 0,
        };
        let limit = query
            .limit
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn merge(&self, id: &str, patch: &RecipePatch) -> Result<bool, StoreError> {
        match self.recipes.write().await.get_mut(id) {
            Some(recipe) => {
                recipe.apply_patch(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace(&self, id: &str, recipe: &NewRecipe) -> Result<WriteOutcome, StoreError> {
        let previous = self
            .recipes
            .write()
            .await
            .insert(id.to_string(), recipe.clone().into_recipe(id.to_string()));

        Ok(match previous {
            Some(_) => WriteOutcome::Replaced,
            None => WriteOutcome::Created,
        })
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.recipes.write().await.remove(id).is_some())
    }

    async fn list_unpublished(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self
            .recipes
            .read()
            .await
            .values()
            .filter(|r| !r.is_published)
            .cloned()
            .collect())
    }

    async fn set_published(&self, id: &str, is_published: bool) -> Result<(), StoreError> {
        if let Some(recipe) = self.recipes.write().await.get_mut(id) {
            recipe.is_published = is_published;
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl CountStore for MemoryStore {
    async fn get_count(&self, collection: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.counts.read().await.get(collection).copied())
    }

    async fn increment_count(&self, collection: &str, delta: i64) -> Result<bool, StoreError> {
        match self.counts.write().await.get_mut(collection) {
            Some(count) => {
                *count = (*count + delta).max(0);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_count(&self, collection: &str, count: i64) -> Result<(), StoreError> {
        self.counts
            .write()
            .await
            .insert(collection.to_string(), count.max(0));
        Ok(())
    }
}
