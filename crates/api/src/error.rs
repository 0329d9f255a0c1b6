use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use recipebox_core::error::CoreError;
use recipebox_core::recipe::INVALID_RECIPE_MESSAGE;
use recipebox_db::StoreError;

use crate::auth::AuthError;

/// Message returned for any 404 on a single document.
pub const NOT_FOUND_MESSAGE: &str = "Document does not exist";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoreError`] and adds HTTP-specific variants.
/// Every variant renders as a status code plus a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `recipebox_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A document store failure. Reported to clients as 400.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A create/replace body failed validation.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Validation failure on a create/replace body.
    pub fn invalid_recipe() -> Self {
        AppError::InvalidPayload(INVALID_RECIPE_MESSAGE.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Core(CoreError::Unauthorized(err.to_string()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
                CoreError::Validation(msg) | CoreError::InvalidQuery(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::InvalidPayload(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        (status, message).into_response()
    }
}

/// Store failures are client errors (400). Missing-document messages are
/// forwarded; database driver detail is logged and replaced.
fn classify_store_error(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::MissingDocument { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Database(db_err) => {
            tracing::error!(error = %db_err, "Document store error");
            (
                StatusCode::BAD_REQUEST,
                "Document store request failed".to_string(),
            )
        }
    }
}
