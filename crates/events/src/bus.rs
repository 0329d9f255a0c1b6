//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans [`RecipeEvent`]s out to every subscriber. Share it via
//! `Arc<EventBus>`; dropping the last handle closes the channel and lets
//! subscribers shut down.

use chrono::{DateTime, Utc};
use recipebox_core::types::DocId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RecipeEvent
// ---------------------------------------------------------------------------

/// Lifecycle transition of a recipe document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeEventKind {
    Created,
    Deleted,
}

/// A recipe document was created or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeEvent {
    pub kind: RecipeEventKind,
    pub recipe_id: DocId,
    /// When the write happened (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RecipeEvent {
    pub fn created(recipe_id: impl Into<DocId>) -> Self {
        Self::new(RecipeEventKind::Created, recipe_id)
    }

    pub fn deleted(recipe_id: impl Into<DocId>) -> Self {
        Self::new(RecipeEventKind::Deleted, recipe_id)
    }

    fn new(kind: RecipeEventKind, recipe_id: impl Into<DocId>) -> Self {
        Self {
            kind,
            recipe_id: recipe_id.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<RecipeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: RecipeEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecipeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
