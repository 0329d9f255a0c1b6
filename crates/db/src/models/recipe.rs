//! Row mapping for the `recipes` table.

use recipebox_core::recipe::Recipe;
use recipebox_core::types::{DocId, Timestamp};
use sqlx::FromRow;

/// A row from the `recipes` table.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: DocId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub serves: i64,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub directions: serde_json::Value,
    pub ingredients: Vec<String>,
    pub publish_date: Timestamp,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            serves: row.serves,
            prep_time: row.prep_time,
            cook_time: row.cook_time,
            total_time: row.total_time,
            directions: row.directions,
            ingredients: row.ingredients,
            publish_date: row.publish_date,
            image_url: row.image_url,
            is_published: row.is_published,
        }
    }
}
