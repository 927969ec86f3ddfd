//! Repository for the `cdn_deletions` outbox table.
//!
//! New rows are written inside the transaction of the delete that orphaned
//! the blob, with `next_attempt_at` pushed out by the claim lease: the
//! request that created them makes the first attempt right after commit, and
//! the background worker only picks them up if that attempt never reports
//! back.

use sqlx::{PgPool, Postgres, Transaction};
use vinyl_core::outbox::CLAIM_LEASE;
use vinyl_core::types::{DbId, Timestamp};

use crate::models::cdn_deletion::CdnDeletion;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, image_public_id, vinyl_record_id, attempts, last_error, \
                       next_attempt_at, failed_at, created_at";

/// Provides outbox operations for pending CDN deletions.
pub struct CdnDeletionRepo;

impl CdnDeletionRepo {
    /// Queue one deletion per public id inside an existing transaction.
    pub async fn enqueue(
        tx: &mut Transaction<'_, Postgres>,
        vinyl_record_id: Option<DbId>,
        public_ids: &[String],
    ) -> Result<Vec<CdnDeletion>, sqlx::Error> {
        if public_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "INSERT INTO cdn_deletions (image_public_id, vinyl_record_id, next_attempt_at)
             SELECT public_id, $2, NOW() + make_interval(secs => $3)
             FROM UNNEST($1::text[]) AS public_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CdnDeletion>(&query)
            .bind(public_ids)
            .bind(vinyl_record_id)
            .bind(CLAIM_LEASE.as_secs_f64())
            .fetch_all(&mut **tx)
            .await
    }

    /// Queue a single deletion inside an existing transaction.
    pub async fn enqueue_one(
        tx: &mut Transaction<'_, Postgres>,
        vinyl_record_id: Option<DbId>,
        public_id: &str,
    ) -> Result<CdnDeletion, sqlx::Error> {
        let query = format!(
            "INSERT INTO cdn_deletions (image_public_id, vinyl_record_id, next_attempt_at)
             VALUES ($1, $2, NOW() + make_interval(secs => $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CdnDeletion>(&query)
            .bind(public_id)
            .bind(vinyl_record_id)
            .bind(CLAIM_LEASE.as_secs_f64())
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an outbox row by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CdnDeletion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cdn_deletions WHERE id = $1");
        sqlx::query_as::<_, CdnDeletion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rows still awaiting a successful CDN delete, oldest first.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<CdnDeletion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cdn_deletions
             WHERE failed_at IS NULL
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, CdnDeletion>(&query)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim up to `limit` due rows for processing.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` and pushes `next_attempt_at` out
    /// by the claim lease so concurrent workers never process the same row.
    pub async fn claim_due(pool: &PgPool, limit: i64) -> Result<Vec<CdnDeletion>, sqlx::Error> {
        let query = format!(
            "UPDATE cdn_deletions
             SET next_attempt_at = NOW() + make_interval(secs => $2)
             WHERE id IN (
                 SELECT id FROM cdn_deletions
                 WHERE failed_at IS NULL AND next_attempt_at <= NOW()
                 ORDER BY next_attempt_at
                 LIMIT $1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CdnDeletion>(&query)
            .bind(limit)
            .bind(CLAIM_LEASE.as_secs_f64())
            .fetch_all(pool)
            .await
    }

    /// Remove a row once the CDN confirmed the delete. Returns `true` if a
    /// row was removed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cdn_deletions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a failed attempt.
    ///
    /// Increments `attempts`, stores the error, and either schedules the next
    /// attempt at `retry_at` or, when `retry_at` is `None`, marks the row
    /// failed for good.
    pub async fn record_failure(
        pool: &PgPool,
        id: DbId,
        error: &str,
        retry_at: Option<Timestamp>,
    ) -> Result<Option<CdnDeletion>, sqlx::Error> {
        let query = format!(
            "UPDATE cdn_deletions SET
                attempts = attempts + 1,
                last_error = $2,
                next_attempt_at = COALESCE($3, next_attempt_at),
                failed_at = CASE WHEN $3::timestamptz IS NULL THEN NOW() ELSE NULL END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CdnDeletion>(&query)
            .bind(id)
            .bind(error)
            .bind(retry_at)
            .fetch_optional(pool)
            .await
    }
}
