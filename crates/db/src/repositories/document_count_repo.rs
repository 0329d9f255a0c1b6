//! Repository for the `document_counts` table.

use sqlx::PgPool;

use crate::models::document_count::DocumentCount;

pub struct DocumentCountRepo;

impl DocumentCountRepo {
    pub async fn find(pool: &PgPool, collection: &str) -> Result<Option<DocumentCount>, sqlx::Error> {
        sqlx::query_as::<_, DocumentCount>(
            "SELECT collection, count, updated_at FROM document_counts WHERE collection = $1",
        )
        .bind(collection)
        .fetch_optional(pool)
        .await
    }

    /// Add `delta` in a single statement so concurrent writers do not lose
    /// updates. The count never drops below zero.
    ///
    /// Returns `false` if the collection has no count row yet.
    pub async fn increment(pool: &PgPool, collection: &str, delta: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE document_counts \
             SET count = GREATEST(count + $2, 0), updated_at = NOW() \
             WHERE collection = $1",
        )
        .bind(collection)
        .bind(delta)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn upsert(pool: &PgPool, collection: &str, count: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO document_counts (collection, count) VALUES ($1, $2) \
             ON CONFLICT (collection) DO UPDATE SET count = EXCLUDED.count, updated_at = NOW()",
        )
        .bind(collection)
        .bind(count.max(0))
        .execute(pool)
        .await?;
        Ok(())
    }
}
