//! Vinyl image entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vinyl_core::types::{DbId, Timestamp};

use crate::models::cdn_deletion::CdnDeletion;

/// A row from the `vinyl_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VinylImage {
    pub id: DbId,
    pub vinyl_record_id: DbId,
    pub image_url: String,
    pub image_public_id: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub created_at: Timestamp,
}

/// One image to append. The client uploads to the CDN first and hands over
/// the resulting URL and public id.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewVinylImage {
    pub image_url: String,
    pub image_public_id: String,
    pub alt_text: Option<String>,
}

/// Request body for `POST /records/{id}/images`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppendImages {
    pub images: Vec<NewVinylImage>,
}

/// One `{id, display_order}` pair of a reorder request.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageOrder {
    pub id: DbId,
    pub display_order: i32,
}

/// Request body for `PATCH /records/{id}/images`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReorderImages {
    pub images: Vec<ImageOrder>,
}

/// Outcome of deleting a single image.
#[derive(Debug, Clone)]
pub struct ImageDeletion {
    pub image: VinylImage,
    /// Images still owned by the record after the delete.
    pub remaining_images: i64,
    /// Outbox row queued for the image's CDN blob.
    pub cdn_deletion: CdnDeletion,
}
