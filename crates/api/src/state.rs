use std::sync::Arc;

use recipebox_db::{CountStore, RecipeStore};
use recipebox_events::EventBus;

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Recipe document store.
    pub recipes: Arc<dyn RecipeStore>,
    /// Denormalized collection counts.
    pub counts: Arc<dyn CountStore>,
    /// Bearer token verifier.
    pub verifier: Arc<TokenVerifier>,
    /// Document lifecycle events; the count trigger subscribes to it.
    pub event_bus: Arc<EventBus>,
    pub config: Arc<ServerConfig>,
}
