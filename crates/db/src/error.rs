use recipebox_core::types::DocId;

/// Errors surfaced by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database call failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An operation referenced a document that does not exist.
    #[error("Document {id} does not exist")]
    MissingDocument { id: DocId },
}
