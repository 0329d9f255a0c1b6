//! Authentication extractors for Axum handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use recipebox_core::query::Visibility;

use crate::error::AppError;
use crate::state::AppState;

/// Caller authenticated by a verified bearer token.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication. A missing, malformed, invalid or expired token rejects
/// the request with 401 before the handler body runs:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<StatusCode> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(StatusCode::OK)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The identity service's user id (from `claims.sub`).
    pub user_id: String,
    pub email: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = state.verifier.verify_headers(&parts.headers)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// Caller of an endpoint where authentication is optional.
///
/// Never rejects: an absent or unverifiable token yields
/// [`Viewer::Anonymous`].
#[derive(Debug, Clone)]
pub enum Viewer {
    Authenticated(AuthUser),
    Anonymous,
}

impl Viewer {
    /// Which documents this caller may list.
    pub fn visibility(&self) -> Visibility {
        match self {
            Viewer::Authenticated(_) => Visibility::All,
            Viewer::Anonymous => Visibility::PublishedOnly,
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(Viewer::Authenticated(user)),
            Err(err) => {
                tracing::debug!(error = %err, "Treating caller as anonymous");
                Ok(Viewer::Anonymous)
            }
        }
    }
}
