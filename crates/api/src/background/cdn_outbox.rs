//! Retries CDN deletes left pending in the `cdn_deletions` outbox.
//!
//! Rows whose post-commit attempt failed (or never ran, e.g. the process
//! died between commit and CDN call) become due once their lease or backoff
//! runs out. Each tick claims a batch with `FOR UPDATE SKIP LOCKED`, so
//! several API instances can run this loop side by side.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use vinyl_cdn::CdnStore;
use vinyl_db::repositories::CdnDeletionRepo;

use crate::cdn_cleanup;

/// Maximum rows claimed per tick.
const BATCH_SIZE: i64 = 50;

/// Run the outbox retry loop until `cancel` is triggered.
pub async fn run(
    pool: PgPool,
    cdn: Arc<dyn CdnStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        store = cdn.name(),
        "CDN outbox worker started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("CDN outbox worker stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = sweep(&pool, cdn.as_ref()).await {
                    tracing::error!(error = %e, "CDN outbox: claim failed");
                }
            }
        }
    }
}

/// Process one batch of due rows. Returns how many were claimed.
pub async fn sweep(pool: &PgPool, cdn: &dyn CdnStore) -> Result<usize, sqlx::Error> {
    let rows = CdnDeletionRepo::claim_due(pool, BATCH_SIZE).await?;
    if rows.is_empty() {
        tracing::debug!("CDN outbox: nothing due");
        return Ok(0);
    }

    let failures = cdn_cleanup::attempt_all(pool, cdn, &rows).await;
    tracing::info!(
        claimed = rows.len(),
        failed = failures.len(),
        "CDN outbox: processed batch"
    );
    Ok(rows.len())
}
