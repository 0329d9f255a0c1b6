use recipebox_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `document_counts` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentCount {
    pub collection: String,
    pub count: i64,
    pub updated_at: Timestamp,
}
