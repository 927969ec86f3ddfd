//! CDN deletes driven by the `cdn_deletions` outbox.
//!
//! Used twice: right after a delete commits (the first attempt, whose
//! failures come back to the client as warnings) and by the background
//! worker for retries. Either way the outbox row is updated to match the
//! outcome. Bookkeeping failures are logged and otherwise ignored: the row
//! stays due and gets picked up again.

use chrono::Utc;
use futures::future::join_all;
use sqlx::PgPool;
use vinyl_cdn::CdnStore;
use vinyl_core::outbox::{is_exhausted, retry_delay};
use vinyl_db::models::cdn_deletion::CdnDeletion;
use vinyl_db::repositories::CdnDeletionRepo;

/// Attempt one queued CDN delete and record the outcome.
///
/// Returns a human-readable warning when the CDN call failed.
pub async fn attempt(pool: &PgPool, cdn: &dyn CdnStore, row: &CdnDeletion) -> Result<(), String> {
    match cdn.delete(&row.image_public_id).await {
        Ok(()) => {
            if let Err(e) = CdnDeletionRepo::complete(pool, row.id).await {
                tracing::warn!(
                    outbox_id = row.id,
                    error = %e,
                    "CDN delete succeeded but outbox row could not be cleared"
                );
            }
            tracing::debug!(
                outbox_id = row.id,
                public_id = %row.image_public_id,
                store = cdn.name(),
                "CDN blob deleted"
            );
            Ok(())
        }
        Err(cdn_err) => {
            let failed_attempts = row.attempts + 1;
            let message = cdn_err.to_string();

            let retry_at = if is_exhausted(failed_attempts) {
                tracing::error!(
                    outbox_id = row.id,
                    public_id = %row.image_public_id,
                    attempts = failed_attempts,
                    error = %message,
                    "CDN delete abandoned after repeated failures"
                );
                None
            } else {
                let delay = retry_delay(failed_attempts);
                tracing::warn!(
                    outbox_id = row.id,
                    public_id = %row.image_public_id,
                    attempts = failed_attempts,
                    retry_in_secs = delay.as_secs(),
                    error = %message,
                    "CDN delete failed, will retry"
                );
                Some(Utc::now() + chrono::Duration::seconds(delay.as_secs() as i64))
            };

            if let Err(e) =
                CdnDeletionRepo::record_failure(pool, row.id, &message, retry_at).await
            {
                tracing::warn!(outbox_id = row.id, error = %e, "Failed to record CDN failure");
            }

            let outcome = if retry_at.is_some() {
                "queued for retry"
            } else {
                "giving up"
            };
            Err(format!(
                "Failed to delete image {} from CDN ({message}); {outcome}",
                row.image_public_id
            ))
        }
    }
}

/// First attempt after a delete commits.
///
/// Without a configured CDN nothing is attempted: the rows stay pending in
/// the outbox and each one is reported as a warning.
pub async fn after_commit(
    pool: &PgPool,
    cdn: Option<&dyn CdnStore>,
    rows: &[CdnDeletion],
) -> Vec<String> {
    match cdn {
        Some(cdn) => attempt_all(pool, cdn, rows).await,
        None => rows
            .iter()
            .map(|row| {
                tracing::warn!(
                    outbox_id = row.id,
                    public_id = %row.image_public_id,
                    "No CDN configured; blob delete left pending"
                );
                format!(
                    "CDN is not configured; image {} stays queued for deletion",
                    row.image_public_id
                )
            })
            .collect(),
    }
}

/// Attempt every row independently and collect the warnings of those that
/// failed, in input order.
pub async fn attempt_all(pool: &PgPool, cdn: &dyn CdnStore, rows: &[CdnDeletion]) -> Vec<String> {
    join_all(rows.iter().map(|row| attempt(pool, cdn, row)))
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect()
}
