//! Handlers for record images: listing, append, reorder, delete.
//!
//! Order maintenance itself lives in `VinylImageRepo`; these handlers
//! validate the payload, translate it, and run the post-commit CDN cleanup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use vinyl_core::error::CoreError;
use vinyl_core::ordering;
use vinyl_core::types::DbId;
use vinyl_core::validation::{self, ALT_TEXT_MAX_LEN};
use vinyl_db::models::vinyl_image::{AppendImages, NewVinylImage, ReorderImages, VinylImage};
use vinyl_db::repositories::{VinylImageRepo, VinylRecordRepo};

use crate::cdn_cleanup;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `DELETE /images/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub id: DbId,
    pub vinyl_record_id: DbId,
    /// Images the record still owns.
    pub remaining_images: i64,
    /// Set when the CDN delete failed after the database delete committed.
    pub warnings: Vec<String>,
}

/// GET /api/v1/records/{id}/images
///
/// Sorted ascending by `display_order`; the first element is the primary
/// image.
pub async fn list_by_record(
    State(state): State<AppState>,
    Path(record_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<VinylImage>>>> {
    ensure_record_exists(&state, record_id).await?;
    let images = VinylImageRepo::list_by_record(&state.pool, record_id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/records/{id}/images
///
/// Append images after the record's current last image, in request order.
pub async fn append(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(record_id): Path<DbId>,
    ApiJson(input): ApiJson<AppendImages>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<VinylImage>>>)> {
    let images = input
        .images
        .iter()
        .map(validate_new_image)
        .collect::<Result<Vec<_>, _>>()?;

    let created = VinylImageRepo::append(&state.pool, record_id, &images).await?;

    tracing::info!(
        record_id,
        user_id = admin.user_id,
        count = created.len(),
        "Images appended"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PATCH /api/v1/records/{id}/images
///
/// Body lists every image of the record with its desired `display_order`.
/// The values only express relative position; the stored orders become
/// `1..=N` following them.
pub async fn reorder(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(record_id): Path<DbId>,
    ApiJson(input): ApiJson<ReorderImages>,
) -> AppResult<Json<DataResponse<Vec<VinylImage>>>> {
    let pairs: Vec<(DbId, i32)> = input
        .images
        .iter()
        .map(|o| (o.id, o.display_order))
        .collect();
    let ordered_ids = ordering::ids_by_requested_order(&pairs)?;

    let images = VinylImageRepo::reorder(&state.pool, record_id, &ordered_ids).await?;

    let stored: Vec<(DbId, i32)> = images.iter().map(|i| (i.id, i.display_order)).collect();
    tracing::info!(
        record_id,
        user_id = admin.user_id,
        primary_image_id = ordering::primary_image_id(&stored),
        "Images reordered"
    );
    Ok(Json(DataResponse { data: images }))
}

/// DELETE /api/v1/images/{id}
///
/// Sibling orders are left as they are. The CDN blob is destroyed after the
/// database delete commits; a failure is reported as a warning and retried
/// in the background.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeleteImageResponse>>> {
    let deletion = VinylImageRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VinylImage",
            id,
        }))?;

    let warnings = cdn_cleanup::after_commit(
        &state.pool,
        state.cdn.as_deref(),
        std::slice::from_ref(&deletion.cdn_deletion),
    )
    .await;

    tracing::info!(
        image_id = id,
        record_id = deletion.image.vinyl_record_id,
        user_id = admin.user_id,
        remaining_images = deletion.remaining_images,
        "Image deleted"
    );
    Ok(Json(DataResponse {
        data: DeleteImageResponse {
            id,
            vinyl_record_id: deletion.image.vinyl_record_id,
            remaining_images: deletion.remaining_images,
            warnings,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_record_exists(state: &AppState, record_id: DbId) -> AppResult<()> {
    VinylRecordRepo::find_by_id(&state.pool, record_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VinylRecord",
            id: record_id,
        }))?;
    Ok(())
}

fn validate_new_image(input: &NewVinylImage) -> Result<NewVinylImage, CoreError> {
    Ok(NewVinylImage {
        image_url: validation::image_url(&input.image_url)?,
        image_public_id: validation::public_id(&input.image_public_id)?,
        alt_text: validation::optional_text("alt_text", input.alt_text.as_deref(), ALT_TEXT_MAX_LEN)?,
    })
}
