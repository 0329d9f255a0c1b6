pub mod document_count;
pub mod recipe;
