//! Integration tests for the PostgreSQL store.
//!
//! Exercises `PgStore` and the repositories against a real database:
//! - Offset and cursor pagination in both sort directions
//! - Missing cursor documents
//! - Merge, replace and delete semantics
//! - Count clamping and the non-negative constraint

use assert_matches::assert_matches;
use chrono::DateTime;
use recipebox_core::query::{ListRecipesParams, RecipeQuery, Visibility};
use recipebox_core::recipe::{NewRecipe, RecipePatch};
use recipebox_core::types::DocId;
use recipebox_db::repositories::{DocumentCountRepo, RecipeRepo};
use recipebox_db::{CountStore, PgStore, RecipeStore, StoreError, WriteOutcome};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_recipe(name: &str, category: &str, serves: i64) -> NewRecipe {
    NewRecipe {
        name: name.into(),
        category: category.into(),
        description: "desc".into(),
        serves,
        prep_time: "5m".into(),
        cook_time: "10m".into(),
        total_time: "15m".into(),
        directions: json!(["mix", "bake"]),
        ingredients: vec!["flour".into(), "eggs".into()],
        publish_date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        image_url: "https://example.com/x.png".into(),
    }
}

fn query(params: ListRecipesParams) -> RecipeQuery {
    RecipeQuery::compose(&params, Visibility::All).unwrap()
}

async fn seeded(store: &PgStore, n: usize) -> Vec<DocId> {
    let mut ids = Vec::new();
    for i in 0..n {
        ids.push(
            store
                .insert(&new_recipe(&format!("r{i:02}"), "mains", 2))
                .await
                .unwrap(),
        );
    }
    ids.sort();
    ids
}

fn ids(recipes: Vec<recipebox_core::recipe::Recipe>) -> Vec<DocId> {
    recipes.into_iter().map(|r| r.id).collect()
}

// ---------------------------------------------------------------------------
// Insert / find
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_round_trips_fields(pool: PgPool) {
    let store = PgStore::new(pool);
    let recipe = new_recipe("Soup", "mains", 4);

    let id = store.insert(&recipe).await.unwrap();
    let found = store.find_by_id(&id).await.unwrap().unwrap();

    assert_eq!(found.id, id);
    assert_eq!(found.name, "Soup");
    assert_eq!(found.directions, json!(["mix", "bake"]));
    assert_eq!(found.ingredients, vec!["flour".to_string(), "eggs".to_string()]);
    assert_eq!(found.publish_date.timestamp(), 1_700_000_000);
    assert!(!found.is_published);
    assert!(store.find_by_id("missing").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_offset_page(pool: PgPool) {
    let store = PgStore::new(pool);
    let all = seeded(&store, 5).await;

    let page = store
        .list(&query(ListRecipesParams {
            page_number: Some("2".into()),
            per_page: Some("2".into()),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(ids(page), all[2..4].to_vec());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_published_category_and_serves(pool: PgPool) {
    let store = PgStore::new(pool);
    let hit = store.insert(&new_recipe("a", "dessert", 4)).await.unwrap();
    let wrong_serves = store.insert(&new_recipe("b", "dessert", 2)).await.unwrap();
    store.insert(&new_recipe("c", "dessert", 4)).await.unwrap();
    store.set_published(&hit, true).await.unwrap();
    store.set_published(&wrong_serves, true).await.unwrap();

    let params = ListRecipesParams {
        category: Some("dessert".into()),
        serves: Some("4".into()),
        ..Default::default()
    };
    let page = store
        .list(&RecipeQuery::compose(&params, Visibility::PublishedOnly).unwrap())
        .await
        .unwrap();

    assert_eq!(ids(page), vec![hit]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_cursor_without_ordering_starts_strictly_after(pool: PgPool) {
    let store = PgStore::new(pool);
    let all = seeded(&store, 4).await;

    let page = store
        .list(&query(ListRecipesParams {
            cursor_id: Some(all[1].clone()),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(ids(page), all[2..].to_vec());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_cursor_ascending(pool: PgPool) {
    let store = PgStore::new(pool);
    let small = store.insert(&new_recipe("a", "mains", 1)).await.unwrap();
    let big = store.insert(&new_recipe("b", "mains", 9)).await.unwrap();
    let mid = store.insert(&new_recipe("c", "mains", 5)).await.unwrap();

    let page = store
        .list(&query(ListRecipesParams {
            order_by_field: Some("serves".into()),
            cursor_id: Some(small),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(ids(page), vec![mid, big]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_cursor_descending(pool: PgPool) {
    let store = PgStore::new(pool);
    let small = store.insert(&new_recipe("a", "mains", 1)).await.unwrap();
    let big = store.insert(&new_recipe("b", "mains", 9)).await.unwrap();
    let mid = store.insert(&new_recipe("c", "mains", 5)).await.unwrap();

    let page = store
        .list(&query(ListRecipesParams {
            order_by_field: Some("serves".into()),
            order_by_direction: Some("desc".into()),
            cursor_id: Some(big),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(ids(page), vec![mid, small]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_cursor_breaks_ties_on_id(pool: PgPool) {
    let store = PgStore::new(pool);
    let all = seeded(&store, 3).await;

    // Every row has serves = 2, so the id decides the position.
    let page = store
        .list(&query(ListRecipesParams {
            order_by_field: Some("serves".into()),
            order_by_direction: Some("desc".into()),
            cursor_id: Some(all[2].clone()),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(ids(page), vec![all[1].clone(), all[0].clone()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_missing_cursor_is_an_error(pool: PgPool) {
    let store = PgStore::new(pool);
    seeded(&store, 2).await;

    let result = store
        .list(&query(ListRecipesParams {
            cursor_id: Some("nope".into()),
            ..Default::default()
        }))
        .await;

    assert_matches!(result, Err(StoreError::MissingDocument { id }) if id == "nope");
}

// ---------------------------------------------------------------------------
// Merge / replace / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_merge_keeps_absent_fields_and_published_flag(pool: PgPool) {
    let store = PgStore::new(pool);
    let id = store.insert(&new_recipe("Soup", "mains", 2)).await.unwrap();
    store.set_published(&id, true).await.unwrap();

    let patch = RecipePatch {
        serves: Some(6),
        ingredients: Some(vec!["leeks".into()]),
        ..Default::default()
    };
    assert!(store.merge(&id, &patch).await.unwrap());

    let found = store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(found.serves, 6);
    assert_eq!(found.ingredients, vec!["leeks".to_string()]);
    assert_eq!(found.name, "Soup");
    assert!(found.is_published);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_merge_nonexistent_returns_false(pool: PgPool) {
    let store = PgStore::new(pool);
    let patch = RecipePatch {
        name: Some("x".into()),
        ..Default::default()
    };
    assert!(!store.merge("ghost", &patch).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_reports_created_then_replaced(pool: PgPool) {
    let store = PgStore::new(pool);

    let outcome = store.replace("custom", &new_recipe("New", "mains", 1)).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Created);

    store.set_published("custom", true).await.unwrap();
    let outcome = store.replace("custom", &new_recipe("Stew", "mains", 3)).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Replaced);

    let found = store.find_by_id("custom").await.unwrap().unwrap();
    assert_eq!(found.name, "Stew");
    assert!(!found.is_published);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_reports_existence(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let id = store.insert(&new_recipe("Soup", "mains", 2)).await.unwrap();

    assert!(store.delete(&id).await.unwrap());
    assert!(!store.delete(&id).await.unwrap());
    assert!(!RecipeRepo::exists(&pool, &id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_unpublished(pool: PgPool) {
    let store = PgStore::new(pool);
    let draft = store.insert(&new_recipe("a", "mains", 2)).await.unwrap();
    let live = store.insert(&new_recipe("b", "mains", 2)).await.unwrap();
    store.set_published(&live, true).await.unwrap();

    let pending = store.list_unpublished().await.unwrap();
    assert_eq!(ids(pending), vec![draft]);
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_counts_clamp_at_zero(pool: PgPool) {
    let store = PgStore::new(pool);
    assert_eq!(store.get_count("recipes").await.unwrap(), None);
    assert!(!store.increment_count("recipes", 1).await.unwrap());

    store.set_count("recipes", 0).await.unwrap();
    assert!(store.increment_count("recipes", -1).await.unwrap());
    assert_eq!(store.get_count("recipes").await.unwrap(), Some(0));

    assert!(store.increment_count("recipes", 2).await.unwrap());
    assert_eq!(store.get_count("recipes").await.unwrap(), Some(2));

    store.set_count("recipes", -5).await.unwrap();
    assert_eq!(store.get_count("recipes").await.unwrap(), Some(0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_negative_count_violates_constraint(pool: PgPool) {
    DocumentCountRepo::upsert(&pool, "recipes", 1).await.unwrap();

    let result = sqlx::query("UPDATE document_counts SET count = -1 WHERE collection = $1")
        .bind("recipes")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "CHECK (count >= 0) should reject negative counts");
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_health_check(pool: PgPool) {
    recipebox_db::health_check(&pool).await.unwrap();
    PgStore::new(pool).health_check().await.unwrap();
}
