//! Repository layer: one struct per table, static async methods over a pool.

pub mod document_count_repo;
pub mod recipe_repo;

pub use document_count_repo::DocumentCountRepo;
pub use recipe_repo::RecipeRepo;
