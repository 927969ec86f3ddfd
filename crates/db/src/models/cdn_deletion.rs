//! CDN deletion outbox model.

use serde::Serialize;
use sqlx::FromRow;
use vinyl_core::types::{DbId, Timestamp};

/// A row from the `cdn_deletions` table: one CDN blob awaiting destruction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CdnDeletion {
    pub id: DbId,
    pub image_public_id: String,
    pub vinyl_record_id: Option<DbId>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: Timestamp,
    pub failed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
