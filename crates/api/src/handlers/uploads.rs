//! Handlers for the `/uploads` resource.
//!
//! Images are uploaded by the browser directly to the CDN. This endpoint lets
//! the admin UI discard an upload that was never attached to a record.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use vinyl_core::error::CoreError;
use vinyl_core::validation;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /uploads/delete`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteUploadRequest {
    pub public_id: String,
}

/// Response body for `POST /uploads/delete`.
#[derive(Debug, Serialize)]
pub struct DeleteUploadResponse {
    pub public_id: String,
    pub deleted: bool,
}

/// POST /api/v1/uploads/delete
///
/// Destroy a CDN blob directly. Unlike image deletes there is no database
/// row involved, so a CDN failure is the request's failure (502), and so is
/// running without a configured CDN (503).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<DeleteUploadRequest>,
) -> AppResult<Json<DataResponse<DeleteUploadResponse>>> {
    let public_id = validation::public_id(&input.public_id)?;

    let cdn = state
        .cdn
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("CDN is not configured".into()))?;

    cdn.delete(&public_id).await.map_err(|e| {
        AppError::Core(CoreError::ExternalStorage(format!(
            "Failed to delete {public_id} from CDN: {e}"
        )))
    })?;

    tracing::info!(user_id = admin.user_id, public_id = %public_id, "Upload deleted from CDN");
    Ok(Json(DataResponse {
        data: DeleteUploadResponse {
            public_id,
            deleted: true,
        },
    }))
}
