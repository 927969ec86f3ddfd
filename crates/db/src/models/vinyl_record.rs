//! Vinyl record entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vinyl_core::types::{DbId, Timestamp};

use crate::models::cdn_deletion::CdnDeletion;
use crate::models::vinyl_image::VinylImage;

/// A row from the `vinyl_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VinylRecord {
    pub id: DbId,
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A record together with its images, sorted by `display_order` ascending.
#[derive(Debug, Clone, Serialize)]
pub struct VinylRecordWithImages {
    #[serde(flatten)]
    pub record: VinylRecord,
    pub images: Vec<VinylImage>,
}

/// DTO for creating a new record. `title` and `artist` are required.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVinylRecord {
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// DTO for a partial update. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateVinylRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// Normalized gallery filter (see `vinyl_core::search`).
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring over title, artist and genre.
    pub query: Option<String>,
    /// Exact, case-insensitive genre match.
    pub genre: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Outcome of a cascading record delete.
#[derive(Debug, Clone)]
pub struct RecordDeletion {
    /// Number of images removed along with the record.
    pub deleted_images_count: i64,
    /// Outbox rows queued for the removed images' CDN blobs.
    pub cdn_deletions: Vec<CdnDeletion>,
}
