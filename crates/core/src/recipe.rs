//! Recipe document model, payload validation, and payload sanitization.
//!
//! Clients send loosely-typed JSON. [`validate_recipe`] checks presence of
//! every required field, [`sanitize_recipe`] projects a full payload onto the
//! eleven client-writable fields, and [`sanitize_recipe_patch`] does the same
//! for partial updates. Any other client-supplied key (`id`, `isPublished`,
//! `count`, ...) is discarded.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::truthy::{field_is_non_empty_array, field_is_truthy};
use crate::types::{DocId, Timestamp};

/// Entity name used in not-found errors.
pub const RECIPE_ENTITY: &str = "Recipe";

/// Client-writable recipe fields, in wire (camelCase) form.
pub const RECIPE_FIELDS: [&str; 11] = [
    "name",
    "category",
    "description",
    "serves",
    "prepTime",
    "cookTime",
    "totalTime",
    "directions",
    "publishDate",
    "ingredients",
    "imageUrl",
];

/// Wire name of the ingredient list; checked for non-emptiness, not truthiness.
const INGREDIENTS_FIELD: &str = "ingredients";

/// Message returned when a create/replace payload fails validation.
pub const INVALID_RECIPE_MESSAGE: &str = "Recipe is not valid. Missing/invalid fields.";

// ---------------------------------------------------------------------------
// Stored document
// ---------------------------------------------------------------------------

/// A stored recipe document, as returned by the API.
///
/// `publishDate` is carried as a UTC timestamp internally and serialized as
/// whole seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: DocId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub serves: i64,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub directions: Value,
    pub ingredients: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub publish_date: Timestamp,
    pub image_url: String,
    pub is_published: bool,
}

impl Recipe {
    /// Merge the present fields of `patch` into this document.
    pub fn apply_patch(&mut self, patch: &RecipePatch) {
        if let Some(v) = &patch.name {
            self.name.clone_from(v);
        }
        if let Some(v) = &patch.category {
            self.category.clone_from(v);
        }
        if let Some(v) = &patch.description {
            self.description.clone_from(v);
        }
        if let Some(v) = patch.serves {
            self.serves = v;
        }
        if let Some(v) = &patch.prep_time {
            self.prep_time.clone_from(v);
        }
        if let Some(v) = &patch.cook_time {
            self.cook_time.clone_from(v);
        }
        if let Some(v) = &patch.total_time {
            self.total_time.clone_from(v);
        }
        if let Some(v) = &patch.directions {
            self.directions.clone_from(v);
        }
        if let Some(v) = patch.publish_date {
            self.publish_date = v;
        }
        if let Some(v) = &patch.ingredients {
            self.ingredients.clone_from(v);
        }
        if let Some(v) = &patch.image_url {
            self.image_url.clone_from(v);
        }
    }

    /// Whether the recipe's publish date has been reached at `now`.
    ///
    /// Compared at whole-second granularity.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.publish_date.timestamp() <= now.timestamp()
    }
}

/// A sanitized create/replace payload: exactly the client-writable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub category: String,
    pub description: String,
    pub serves: i64,
    pub prep_time: String,
    pub cook_time: String,
    pub total_time: String,
    pub directions: Value,
    pub ingredients: Vec<String>,
    pub publish_date: Timestamp,
    pub image_url: String,
}

impl NewRecipe {
    /// Materialize a stored document. New and replaced documents start unpublished.
    pub fn into_recipe(self, id: DocId) -> Recipe {
        Recipe {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            serves: self.serves,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            total_time: self.total_time,
            directions: self.directions,
            ingredients: self.ingredients,
            publish_date: self.publish_date,
            image_url: self.image_url,
            is_published: false,
        }
    }
}

/// A sanitized partial update. `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub serves: Option<i64>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
    pub directions: Option<Value>,
    pub ingredients: Option<Vec<String>>,
    pub publish_date: Option<Timestamp>,
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a create/replace payload.
///
/// Returns `true` iff the payload is an object where every required field is
/// present and truthy and `ingredients` is a non-empty array. A missing or
/// non-array `ingredients` is simply invalid.
pub fn validate_recipe(payload: &Value) -> bool {
    let Some(obj) = payload.as_object() else {
        return false;
    };

    RECIPE_FIELDS
        .iter()
        .filter(|field| **field != INGREDIENTS_FIELD)
        .all(|field| field_is_truthy(obj, field))
        && field_is_non_empty_array(obj, INGREDIENTS_FIELD)
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Typed view of the projected wire fields. `publishDate` is still seconds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeFields {
    name: String,
    category: String,
    description: String,
    serves: i64,
    prep_time: String,
    cook_time: String,
    total_time: String,
    directions: Value,
    ingredients: Vec<String>,
    publish_date: f64,
    image_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipePatchFields {
    name: Option<String>,
    category: Option<String>,
    description: Option<String>,
    serves: Option<i64>,
    prep_time: Option<String>,
    cook_time: Option<String>,
    total_time: Option<String>,
    directions: Option<Value>,
    ingredients: Option<Vec<String>>,
    publish_date: Option<f64>,
    image_url: Option<String>,
}

/// Project a full payload onto the client-writable fields.
///
/// Callers validate first; this only fails when a projected field has an
/// unusable type (e.g. `serves: "four"`).
pub fn sanitize_recipe(payload: &Value) -> Result<NewRecipe, CoreError> {
    let projected = project(payload, |_, _| true);
    let fields: RecipeFields = serde_json::from_value(Value::Object(projected))
        .map_err(|e| CoreError::Validation(format!("Invalid recipe field: {e}")))?;

    Ok(NewRecipe {
        name: fields.name,
        category: fields.category,
        description: fields.description,
        serves: fields.serves,
        prep_time: fields.prep_time,
        cook_time: fields.cook_time,
        total_time: fields.total_time,
        directions: fields.directions,
        ingredients: fields.ingredients,
        publish_date: publish_date_from_seconds(fields.publish_date)?,
        image_url: fields.image_url,
    })
}

/// Project a partial payload onto the client-writable fields.
///
/// A field is copied only when present and truthy, so explicit `false`, `0`
/// and `""` updates are dropped. `ingredients` is copied only when it is a
/// non-empty array.
pub fn sanitize_recipe_patch(payload: &Value) -> Result<RecipePatch, CoreError> {
    let projected = project(payload, |obj, field| {
        if field == INGREDIENTS_FIELD {
            field_is_non_empty_array(obj, field)
        } else {
            field_is_truthy(obj, field)
        }
    });
    let fields: RecipePatchFields = serde_json::from_value(Value::Object(projected))
        .map_err(|e| CoreError::Validation(format!("Invalid recipe field: {e}")))?;

    Ok(RecipePatch {
        name: fields.name,
        category: fields.category,
        description: fields.description,
        serves: fields.serves,
        prep_time: fields.prep_time,
        cook_time: fields.cook_time,
        total_time: fields.total_time,
        directions: fields.directions,
        ingredients: fields.ingredients,
        publish_date: fields.publish_date.map(publish_date_from_seconds).transpose()?,
        image_url: fields.image_url,
    })
}

/// Copy the allowed fields accepted by `keep` into a fresh object.
fn project(
    payload: &Value,
    keep: impl Fn(&Map<String, Value>, &str) -> bool,
) -> Map<String, Value> {
    let mut out = Map::new();
    let Some(obj) = payload.as_object() else {
        return out;
    };

    for field in RECIPE_FIELDS {
        if let Some(value) = obj.get(field) {
            if keep(obj, field) {
                out.insert(field.to_string(), value.clone());
            }
        }
    }
    out
}

/// Convert client seconds-since-epoch into a timestamp (seconds × 1000 ms).
pub fn publish_date_from_seconds(seconds: f64) -> Result<Timestamp, CoreError> {
    let millis = seconds * 1000.0;
    if !millis.is_finite() {
        return Err(CoreError::Validation(format!(
            "publishDate {seconds} is not a valid timestamp"
        )));
    }

    DateTime::from_timestamp_millis(millis as i64).ok_or_else(|| {
        CoreError::Validation(format!("publishDate {seconds} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "name": "Lemon Tart",
            "category": "desserts",
            "description": "Sharp and sweet",
            "serves": 6,
            "prepTime": "30m",
            "cookTime": "45m",
            "totalTime": "1h15m",
            "directions": "Blind bake the shell, then fill.",
            "publishDate": 1_700_000_000,
            "ingredients": ["lemons", "eggs", "sugar"],
            "imageUrl": "https://example.com/tart.jpg"
        })
    }

    // -- validate_recipe ----------------------------------------------------

    #[test]
    fn complete_payload_is_valid() {
        assert!(validate_recipe(&full_payload()));
    }

    #[test]
    fn each_missing_field_is_invalid() {
        for field in RECIPE_FIELDS {
            let mut payload = full_payload();
            payload.as_object_mut().unwrap().remove(field);
            assert!(!validate_recipe(&payload), "missing {field} should be invalid");
        }
    }

    #[test]
    fn falsy_required_field_is_invalid() {
        let mut payload = full_payload();
        payload["serves"] = json!(0);
        assert!(!validate_recipe(&payload));

        let mut payload = full_payload();
        payload["name"] = json!("");
        assert!(!validate_recipe(&payload));
    }

    #[test]
    fn empty_ingredients_is_invalid() {
        let mut payload = full_payload();
        payload["ingredients"] = json!([]);
        assert!(!validate_recipe(&payload));
    }

    #[test]
    fn non_array_ingredients_is_invalid() {
        let mut payload = full_payload();
        payload["ingredients"] = json!("lemons");
        assert!(!validate_recipe(&payload));
    }

    #[test]
    fn non_object_payload_is_invalid() {
        assert!(!validate_recipe(&json!(null)));
        assert!(!validate_recipe(&json!([1, 2, 3])));
    }

    // -- sanitize_recipe ----------------------------------------------------

    #[test]
    fn sanitize_drops_injected_fields() {
        let mut payload = full_payload();
        payload["isPublished"] = json!(true);
        payload["count"] = json!(99);
        payload["id"] = json!("forged");

        let recipe = sanitize_recipe(&payload).unwrap().into_recipe("real".into());
        let out = serde_json::to_value(&recipe).unwrap();
        let keys: Vec<&str> = out.as_object().unwrap().keys().map(String::as_str).collect();

        assert_eq!(recipe.id, "real");
        assert!(!recipe.is_published);
        assert!(!keys.contains(&"count"));
        for field in RECIPE_FIELDS {
            assert!(keys.contains(&field), "{field} should be present");
        }
        // Eleven fields plus `id` and `isPublished`.
        assert_eq!(keys.len(), RECIPE_FIELDS.len() + 2);
    }

    #[test]
    fn sanitize_converts_publish_date_seconds() {
        let recipe = sanitize_recipe(&full_payload()).unwrap();
        assert_eq!(recipe.publish_date.timestamp(), 1_700_000_000);
        assert_eq!(recipe.publish_date.timestamp_subsec_millis(), 0);
    }

    #[test]
    fn sanitize_keeps_fractional_seconds_as_millis() {
        let mut payload = full_payload();
        payload["publishDate"] = json!(1_700_000_000.5);
        let recipe = sanitize_recipe(&payload).unwrap();
        assert_eq!(recipe.publish_date.timestamp_millis(), 1_700_000_000_500);
    }

    #[test]
    fn sanitize_rejects_wrong_types() {
        let mut payload = full_payload();
        payload["serves"] = json!("four");
        assert_matches!(sanitize_recipe(&payload), Err(CoreError::Validation(_)));
    }

    #[test]
    fn sanitize_accepts_structured_directions() {
        let mut payload = full_payload();
        payload["directions"] = json!(["step one", "step two"]);
        let recipe = sanitize_recipe(&payload).unwrap();
        assert_eq!(recipe.directions, json!(["step one", "step two"]));
    }

    // -- sanitize_recipe_patch ----------------------------------------------

    #[test]
    fn patch_copies_only_truthy_fields() {
        let patch = sanitize_recipe_patch(&json!({
            "name": "Renamed",
            "description": "",
            "serves": 0,
            "isPublished": true,
            "ingredients": []
        }))
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Renamed"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.serves, None);
        assert_eq!(patch.ingredients, None);
        assert_eq!(patch.category, None);
    }

    #[test]
    fn patch_converts_publish_date() {
        let patch = sanitize_recipe_patch(&json!({"publishDate": 1_600_000_000})).unwrap();
        assert_eq!(patch.publish_date.map(|d| d.timestamp()), Some(1_600_000_000));
    }

    #[test]
    fn patch_keeps_non_empty_ingredients() {
        let patch = sanitize_recipe_patch(&json!({"ingredients": ["salt"]})).unwrap();
        assert_eq!(patch.ingredients, Some(vec!["salt".to_string()]));
    }

    #[test]
    fn unknown_patch_fields_are_dropped() {
        let patch = sanitize_recipe_patch(&json!({"unknown": 1})).unwrap();
        assert_eq!(patch, RecipePatch::default());
    }

    #[test]
    fn apply_patch_leaves_absent_fields() {
        let mut recipe = sanitize_recipe(&full_payload()).unwrap().into_recipe("r1".into());
        let patch = sanitize_recipe_patch(&json!({"serves": 8, "category": "pies"})).unwrap();
        recipe.apply_patch(&patch);

        assert_eq!(recipe.serves, 8);
        assert_eq!(recipe.category, "pies");
        assert_eq!(recipe.name, "Lemon Tart");
    }

    #[test]
    fn serialized_publish_date_is_seconds() {
        let recipe = sanitize_recipe(&full_payload()).unwrap().into_recipe("r1".into());
        let out = serde_json::to_value(&recipe).unwrap();
        assert_eq!(out["publishDate"], json!(1_700_000_000));
        assert_eq!(out["imageUrl"], json!("https://example.com/tart.jpg"));
    }

    #[test]
    fn is_due_compares_seconds() {
        let recipe = sanitize_recipe(&full_payload()).unwrap().into_recipe("r1".into());
        let before = DateTime::from_timestamp(1_699_999_999, 0).unwrap();
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert!(!recipe.is_due(before));
        assert!(recipe.is_due(at));
    }
}
