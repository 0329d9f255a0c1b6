//! Daily publish sweep.
//!
//! At every UTC midnight, flips `isPublished` to `true` on unpublished
//! recipes whose publish date has been reached. Each run is bounded by the
//! configured timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use recipebox_db::{RecipeStore, StoreError};
use tokio_util::sync::CancellationToken;

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Unpublished recipes looked at.
    pub examined: usize,
    /// Recipes flipped to published.
    pub published: usize,
}

/// Run a single sweep against `store` as of `now`.
///
/// Recipes not yet due get `isPublished = false` written back unchanged.
pub async fn sweep_once(
    store: &dyn RecipeStore,
    now: DateTime<Utc>,
) -> Result<SweepReport, StoreError> {
    let pending = store.list_unpublished().await?;
    let mut report = SweepReport {
        examined: pending.len(),
        published: 0,
    };

    for recipe in &pending {
        let due = recipe.is_due(now);
        store.set_published(&recipe.id, due).await?;
        if due {
            report.published += 1;
            tracing::info!(recipe_id = %recipe.id, name = %recipe.name, "Recipe published");
        }
    }

    Ok(report)
}

/// Time remaining until the next UTC midnight strictly after `now`.
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc());

    match next {
        Some(next) => (next - now).to_std().unwrap_or(Duration::ZERO),
        // Only reachable at the end of chrono's date range.
        None => Duration::from_secs(24 * 3600),
    }
}

/// Run the sweep loop.
///
/// Sleeps until each UTC midnight, then sweeps with `timeout` as the upper
/// bound. Runs until `cancel` is triggered.
pub async fn run(store: Arc<dyn RecipeStore>, timeout: Duration, cancel: CancellationToken) {
    tracing::info!(timeout_secs = timeout.as_secs(), "Publish sweep started");

    loop {
        let wait = until_next_midnight(Utc::now());
        tracing::debug!(wait_secs = wait.as_secs(), "Publish sweep sleeping");

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Publish sweep stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                match tokio::time::timeout(timeout, sweep_once(store.as_ref(), Utc::now())).await {
                    Ok(Ok(report)) => {
                        tracing::info!(
                            examined = report.examined,
                            published = report.published,
                            "Publish sweep complete"
                        );
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Publish sweep failed");
                    }
                    Err(_) => {
                        tracing::error!(timeout_secs = timeout.as_secs(), "Publish sweep timed out");
                    }
                }
            }
        }
    }
}
