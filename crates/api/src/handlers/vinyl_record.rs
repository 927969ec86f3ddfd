//! Handlers for the `/records` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Datelike;
use serde::Serialize;
use vinyl_core::error::CoreError;
use vinyl_core::types::DbId;
use vinyl_core::validation::{self, ARTIST_MAX_LEN, DESCRIPTION_MAX_LEN, GENRE_MAX_LEN, TITLE_MAX_LEN};
use vinyl_db::models::vinyl_record::{
    CreateVinylRecord, UpdateVinylRecord, VinylRecord, VinylRecordWithImages,
};
use vinyl_db::repositories::VinylRecordRepo;

use crate::cdn_cleanup;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::rbac::RequireAdmin;
use crate::query::RecordListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for `DELETE /records/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteRecordResponse {
    pub deleted_images_count: i64,
    /// CDN deletes that failed after the database delete committed.
    pub warnings: Vec<String>,
}

/// GET /api/v1/records
///
/// Newest first, each record with its images in display order.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RecordListParams>,
) -> AppResult<Json<DataResponse<Vec<VinylRecordWithImages>>>> {
    let records = VinylRecordRepo::list(&state.pool, &params.into_filter()).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/records/genres
pub async fn list_genres(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let genres = VinylRecordRepo::list_genres(&state.pool).await?;
    Ok(Json(DataResponse { data: genres }))
}

/// GET /api/v1/records/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VinylRecordWithImages>>> {
    let record = VinylRecordRepo::find_with_images(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VinylRecord",
            id,
        }))?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/records
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<CreateVinylRecord>,
) -> AppResult<(StatusCode, Json<DataResponse<VinylRecordWithImages>>)> {
    let input = validate_create(input)?;
    let record = VinylRecordRepo::create(&state.pool, &input).await?;

    tracing::info!(record_id = record.id, user_id = admin.user_id, "Record created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: VinylRecordWithImages {
                record,
                images: Vec::new(),
            },
        }),
    ))
}

/// PUT /api/v1/records/{id}
///
/// Partial update: omitted fields keep their current value.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    ApiJson(input): ApiJson<UpdateVinylRecord>,
) -> AppResult<Json<DataResponse<VinylRecord>>> {
    let input = validate_update(input)?;
    let record = VinylRecordRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VinylRecord",
            id,
        }))?;
    Ok(Json(DataResponse { data: record }))
}

/// DELETE /api/v1/records/{id}
///
/// Removes the record and all of its images. CDN blobs are destroyed after
/// the database delete commits; failures come back as warnings and are
/// retried in the background.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeleteRecordResponse>>> {
    let deletion = VinylRecordRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VinylRecord",
            id,
        }))?;

    let warnings =
        cdn_cleanup::after_commit(&state.pool, state.cdn.as_deref(), &deletion.cdn_deletions)
            .await;

    tracing::info!(
        record_id = id,
        user_id = admin.user_id,
        deleted_images_count = deletion.deleted_images_count,
        cdn_failures = warnings.len(),
        "Record deleted"
    );
    Ok(Json(DataResponse {
        data: DeleteRecordResponse {
            deleted_images_count: deletion.deleted_images_count,
            warnings,
        },
    }))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn check_year(year: Option<i32>) -> Result<Option<i32>, CoreError> {
    if let Some(year) = year {
        validation::validate_year(year, current_year())?;
    }
    Ok(year)
}

/// Trim and bound every field; blank optionals become `None`.
fn validate_create(input: CreateVinylRecord) -> Result<CreateVinylRecord, CoreError> {
    Ok(CreateVinylRecord {
        title: validation::required_text("title", &input.title, TITLE_MAX_LEN)?,
        artist: validation::required_text("artist", &input.artist, ARTIST_MAX_LEN)?,
        year: check_year(input.year)?,
        genre: validation::optional_text("genre", input.genre.as_deref(), GENRE_MAX_LEN)?,
        description: validation::optional_text(
            "description",
            input.description.as_deref(),
            DESCRIPTION_MAX_LEN,
        )?,
    })
}

/// Present fields follow the create rules. A blank optional is dropped, so
/// it leaves the stored value alone.
fn validate_update(input: UpdateVinylRecord) -> Result<UpdateVinylRecord, CoreError> {
    Ok(UpdateVinylRecord {
        title: input
            .title
            .map(|t| validation::required_text("title", &t, TITLE_MAX_LEN))
            .transpose()?,
        artist: input
            .artist
            .map(|a| validation::required_text("artist", &a, ARTIST_MAX_LEN))
            .transpose()?,
        year: check_year(input.year)?,
        genre: validation::optional_text("genre", input.genre.as_deref(), GENRE_MAX_LEN)?,
        description: validation::optional_text(
            "description",
            input.description.as_deref(),
            DESCRIPTION_MAX_LEN,
        )?,
    })
}
