//! Document count triggers.
//!
//! [`CountTrigger`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! keeps the collection's denormalized count in step with recipe creates and
//! deletes. Delivery is at-least-once with no idempotency key, so a
//! redelivered event is counted twice; the count is an approximation and is
//! never recomputed from the collection.

use std::sync::Arc;

use recipebox_db::{CountStore, StoreError};
use tokio::sync::broadcast;

use crate::bus::{RecipeEvent, RecipeEventKind};

/// Background service that maintains one collection's document count.
pub struct CountTrigger {
    counts: Arc<dyn CountStore>,
    collection: String,
}

impl CountTrigger {
    pub fn new(counts: Arc<dyn CountStore>, collection: impl Into<String>) -> Self {
        Self {
            counts,
            collection: collection.into(),
        }
    }

    /// Run the trigger loop until the bus is dropped.
    ///
    /// Failures are logged and the loop keeps going; a failed event is not
    /// retried.
    pub async fn run(self, mut receiver: broadcast::Receiver<RecipeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.apply(&event).await {
                        tracing::error!(
                            error = %e,
                            recipe_id = %event.recipe_id,
                            kind = ?event.kind,
                            "Failed to update document count"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        collection = %self.collection,
                        "Count trigger lagged, document count has drifted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, count trigger shutting down");
                    break;
                }
            }
        }
    }

    /// Apply one lifecycle event to the count document.
    ///
    /// If the count document exists it is incremented (create) or
    /// decremented (delete) atomically. Otherwise it is created with `1` on
    /// create and `0` on delete.
    pub async fn apply(&self, event: &RecipeEvent) -> Result<(), StoreError> {
        let (delta, initial) = match event.kind {
            RecipeEventKind::Created => (1, 1),
            RecipeEventKind::Deleted => (-1, 0),
        };

        let exists = self.counts.get_count(&self.collection).await?.is_some();
        // The row can vanish between the read and the update; fall back to
        // creating it.
        if !exists || !self.counts.increment_count(&self.collection, delta).await? {
            self.counts.set_count(&self.collection, initial).await?;
        }

        tracing::debug!(
            collection = %self.collection,
            recipe_id = %event.recipe_id,
            delta,
            lag_ms = (chrono::Utc::now() - event.timestamp).num_milliseconds(),
            "Document count updated"
        );
        Ok(())
    }
}
