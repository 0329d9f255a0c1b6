//! Repository for the `recipes` table.

use recipebox_core::query::{Filter, OrderBy, PageStart, RecipeQuery, SortDirection};
use recipebox_core::recipe::{NewRecipe, RecipePatch};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::recipe::RecipeRow;
use crate::store::WriteOutcome;

/// Column list for `recipes` queries.
const RECIPE_COLUMNS: &str = "\
    id, name, category, description, serves, prep_time, cook_time, total_time, \
    directions, ingredients, publish_date, image_url, is_published, \
    created_at, updated_at";

/// Provides CRUD and query operations for recipes.
pub struct RecipeRepo;

impl RecipeRepo {
    /// Insert a new recipe under a caller-assigned id.
    pub async fn insert(pool: &PgPool, id: &str, recipe: &NewRecipe) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO recipes \
                 (id, name, category, description, serves, prep_time, cook_time, \
                  total_time, directions, ingredients, publish_date, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(id)
        .bind(&recipe.name)
        .bind(&recipe.category)
        .bind(&recipe.description)
        .bind(recipe.serves)
        .bind(&recipe.prep_time)
        .bind(&recipe.cook_time)
        .bind(&recipe.total_time)
        .bind(&recipe.directions)
        .bind(&recipe.ingredients)
        .bind(recipe.publish_date)
        .bind(&recipe.image_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a recipe by its id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<RecipeRow>, sqlx::Error> {
        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1");
        sqlx::query_as::<_, RecipeRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Run a composed list query.
    ///
    /// Rows are always ordered with `id` as the final sort key so that cursor
    /// pagination ("strictly after the cursor row") is well defined. The
    /// caller is responsible for checking that the cursor row exists.
    pub async fn list(pool: &PgPool, query: &RecipeQuery) -> Result<Vec<RecipeRow>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE TRUE"));

        for filter in &query.filters {
            match filter {
                Filter::IsPublished(v) => {
                    qb.push(" AND is_published = ").push_bind(*v);
                }
                Filter::Category(v) => {
                    qb.push(" AND category = ").push_bind(v.clone());
                }
                Filter::Serves(v) => {
                    qb.push(" AND serves = ").push_bind(*v);
                }
            }
        }

        if let Some(cursor) = query.cursor() {
            match query.order {
                Some(OrderBy { field, direction }) => {
                    let column = field.column();
                    let op = match direction {
                        SortDirection::Asc => ">",
                        SortDirection::Desc => "<",
                    };
                    qb.push(format!(
                        " AND ({column}, id) {op} (SELECT {column}, id FROM recipes WHERE id = "
                    ))
                    .push_bind(cursor.to_string())
                    .push(")");
                }
                None => {
                    qb.push(" AND id > ").push_bind(cursor.to_string());
                }
            }
        }

        match query.order {
            Some(OrderBy { field, direction }) => {
                qb.push(format!(
                    " ORDER BY {column} {dir}, id {dir}",
                    column = field.column(),
                    dir = direction.sql()
                ));
            }
            None => {
                qb.push(" ORDER BY id ASC");
            }
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        if let Some(PageStart::Offset(offset)) = &query.start {
            qb.push(" OFFSET ").push_bind(*offset);
        }

        qb.build_query_as::<RecipeRow>().fetch_all(pool).await
    }

    /// Merge the present patch fields into an existing row.
    ///
    /// Returns `false` if no row has this id.
    pub async fn merge(pool: &PgPool, id: &str, patch: &RecipePatch) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recipes SET \
                 name = COALESCE($2, name), \
                 category = COALESCE($3, category), \
                 description = COALESCE($4, description), \
                 serves = COALESCE($5, serves), \
                 prep_time = COALESCE($6, prep_time), \
                 cook_time = COALESCE($7, cook_time), \
                 total_time = COALESCE($8, total_time), \
                 directions = COALESCE($9, directions), \
                 ingredients = COALESCE($10, ingredients), \
                 publish_date = COALESCE($11, publish_date), \
                 image_url = COALESCE($12, image_url), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.serves)
        .bind(patch.prep_time.as_deref())
        .bind(patch.cook_time.as_deref())
        .bind(patch.total_time.as_deref())
        .bind(patch.directions.as_ref())
        .bind(patch.ingredients.as_deref())
        .bind(patch.publish_date)
        .bind(patch.image_url.as_deref())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the row under `id`, creating it if absent.
    ///
    /// A replace resets `is_published`; only the publish sweep sets it.
    pub async fn upsert(
        pool: &PgPool,
        id: &str,
        recipe: &NewRecipe,
    ) -> Result<WriteOutcome, sqlx::Error> {
        // `xmax = 0` only holds for a freshly inserted tuple.
        let inserted = sqlx::query_scalar::<_, bool>(
            "INSERT INTO recipes \
                 (id, name, category, description, serves, prep_time, cook_time, \
                  total_time, directions, ingredients, publish_date, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 category = EXCLUDED.category, \
                 description = EXCLUDED.description, \
                 serves = EXCLUDED.serves, \
                 prep_time = EXCLUDED.prep_time, \
                 cook_time = EXCLUDED.cook_time, \
                 total_time = EXCLUDED.total_time, \
                 directions = EXCLUDED.directions, \
                 ingredients = EXCLUDED.ingredients, \
                 publish_date = EXCLUDED.publish_date, \
                 image_url = EXCLUDED.image_url, \
                 is_published = FALSE, \
                 updated_at = NOW() \
             RETURNING (xmax = 0)",
        )
        .bind(id)
        .bind(&recipe.name)
        .bind(&recipe.category)
        .bind(&recipe.description)
        .bind(recipe.serves)
        .bind(&recipe.prep_time)
        .bind(&recipe.cook_time)
        .bind(&recipe.total_time)
        .bind(&recipe.directions)
        .bind(&recipe.ingredients)
        .bind(recipe.publish_date)
        .bind(&recipe.image_url)
        .fetch_one(pool)
        .await?;

        Ok(if inserted {
            WriteOutcome::Created
        } else {
            WriteOutcome::Replaced
        })
    }

    /// Delete a recipe. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All recipes not yet published.
    pub async fn list_unpublished(pool: &PgPool) -> Result<Vec<RecipeRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE is_published = FALSE ORDER BY id"
        );
        sqlx::query_as::<_, RecipeRow>(&query).fetch_all(pool).await
    }

    pub async fn set_published(
        pool: &PgPool,
        id: &str,
        is_published: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE recipes SET is_published = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(is_published)
            .execute(pool)
            .await?;
        Ok(())
    }
}
