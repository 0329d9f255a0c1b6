//! List query composition.
//!
//! Turns the raw `GET /recipes` query string into a [`RecipeQuery`]: a
//! visibility filter, equality filters, ordering, a limit, and either an
//! offset or a cursor. Store backends execute the plan; nothing here touches
//! I/O.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::error::CoreError;
use crate::recipe::Recipe;
use crate::types::{DocId, Timestamp};

// ---------------------------------------------------------------------------
// Raw parameters
// ---------------------------------------------------------------------------

/// Query parameters accepted by `GET /recipes`.
///
/// Kept as strings so empty values (`?category=`) can be treated as absent
/// and numeric parse failures can be reported with the parameter name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecipesParams {
    pub category: Option<String>,
    pub serves: Option<String>,
    pub order_by_field: Option<String>,
    pub order_by_direction: Option<String>,
    pub page_number: Option<String>,
    pub per_page: Option<String>,
    pub cursor_id: Option<String>,
}

/// Whether the caller may see unpublished recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Verified caller: no restriction.
    All,
    /// Anonymous or unverifiable caller: only `isPublished == true`.
    PublishedOnly,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Fields a list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeField {
    Name,
    Category,
    Description,
    Serves,
    PrepTime,
    CookTime,
    TotalTime,
    PublishDate,
    ImageUrl,
    IsPublished,
}

impl RecipeField {
    /// Parse a wire (camelCase) field name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Self::Name,
            "category" => Self::Category,
            "description" => Self::Description,
            "serves" => Self::Serves,
            "prepTime" => Self::PrepTime,
            "cookTime" => Self::CookTime,
            "totalTime" => Self::TotalTime,
            "publishDate" => Self::PublishDate,
            "imageUrl" => Self::ImageUrl,
            "isPublished" => Self::IsPublished,
            _ => return None,
        })
    }

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Description => "description",
            Self::Serves => "serves",
            Self::PrepTime => "prep_time",
            Self::CookTime => "cook_time",
            Self::TotalTime => "total_time",
            Self::PublishDate => "publish_date",
            Self::ImageUrl => "image_url",
            Self::IsPublished => "is_published",
        }
    }

    /// The sortable value of this field on `recipe`.
    pub fn value_of(self, recipe: &Recipe) -> FieldValue {
        match self {
            Self::Name => FieldValue::Text(recipe.name.clone()),
            Self::Category => FieldValue::Text(recipe.category.clone()),
            Self::Description => FieldValue::Text(recipe.description.clone()),
            Self::Serves => FieldValue::Int(recipe.serves),
            Self::PrepTime => FieldValue::Text(recipe.prep_time.clone()),
            Self::CookTime => FieldValue::Text(recipe.cook_time.clone()),
            Self::TotalTime => FieldValue::Text(recipe.total_time.clone()),
            Self::PublishDate => FieldValue::Time(recipe.publish_date),
            Self::ImageUrl => FieldValue::Text(recipe.image_url.clone()),
            Self::IsPublished => FieldValue::Bool(recipe.is_published),
        }
    }
}

/// A comparable field value. Values of one field always share a variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Time(Timestamp),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending comparison.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Self::Asc => ord,
            Self::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: RecipeField,
    pub direction: SortDirection,
}

/// Equality filter applied before ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    IsPublished(bool),
    Category(String),
    Serves(i64),
}

impl Filter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Self::IsPublished(v) => recipe.is_published == *v,
            Self::Category(v) => recipe.category == *v,
            Self::Serves(v) => recipe.serves == *v,
        }
    }
}

/// Where a page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStart {
    /// Skip this many matching documents.
    Offset(i64),
    /// Start strictly after this document's position in the ordering.
    After(DocId),
}

/// A composed list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<i64>,
    pub start: Option<PageStart>,
}

impl RecipeQuery {
    /// Compose a query from raw parameters.
    ///
    /// Order of composition: visibility, category, serves, ordering, limit,
    /// then offset or cursor. Offset pagination wins when both `pageNumber > 0`
    /// and `perPage` are given; otherwise `cursorId` is used if set.
    pub fn compose(params: &ListRecipesParams, visibility: Visibility) -> Result<Self, CoreError> {
        let mut query = RecipeQuery::default();

        if visibility == Visibility::PublishedOnly {
            query.filters.push(Filter::IsPublished(true));
        }

        if let Some(category) = non_empty(&params.category) {
            query.filters.push(Filter::Category(category.to_string()));
        }

        if let Some(serves) = parse_int(&params.serves, "serves")? {
            query.filters.push(Filter::Serves(serves));
        }

        if let Some(field) = non_empty(&params.order_by_field) {
            let field = RecipeField::from_wire(field).ok_or_else(|| {
                CoreError::InvalidQuery(format!("orderByField '{field}' is not sortable"))
            })?;
            let direction = match non_empty(&params.order_by_direction) {
                None | Some("asc") => SortDirection::Asc,
                Some("desc") => SortDirection::Desc,
                Some(other) => {
                    return Err(CoreError::InvalidQuery(format!(
                        "orderByDirection '{other}' must be 'asc' or 'desc'"
                    )))
                }
            };
            query.order = Some(OrderBy { field, direction });
        }

        let per_page = parse_int(&params.per_page, "perPage")?;
        if let Some(per_page) = per_page {
            if per_page < 1 {
                return Err(CoreError::InvalidQuery(
                    "perPage must be at least 1".to_string(),
                ));
            }
            query.limit = Some(per_page);
        }

        let page_number = parse_int(&params.page_number, "pageNumber")?;
        match (page_number, per_page) {
            (Some(page), Some(per_page)) if page > 0 => {
                let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
                    CoreError::InvalidQuery("pageNumber/perPage out of range".to_string())
                })?;
                query.start = Some(PageStart::Offset(offset));
            }
            _ => {
                if let Some(cursor) = non_empty(&params.cursor_id) {
                    query.start = Some(PageStart::After(cursor.to_string()));
                }
            }
        }

        Ok(query)
    }

    /// Whether `recipe` passes every filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.filters.iter().all(|f| f.matches(recipe))
    }

    /// Compare two documents by the query ordering, tie-breaking on id.
    ///
    /// Without an explicit ordering, documents are ordered by id ascending.
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        match self.order {
            Some(OrderBy { field, direction }) => direction.apply(
                field
                    .value_of(a)
                    .cmp(&field.value_of(b))
                    .then_with(|| a.id.cmp(&b.id)),
            ),
            None => a.id.cmp(&b.id),
        }
    }

    /// The cursor document id, when cursor pagination is in effect.
    pub fn cursor(&self) -> Option<&str> {
        match &self.start {
            Some(PageStart::After(id)) => Some(id),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_int(value: &Option<String>, name: &str) -> Result<Option<i64>, CoreError> {
    non_empty(value)
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| CoreError::InvalidQuery(format!("{name} must be an integer, got '{v}'")))
        })
        .transpose()
}
