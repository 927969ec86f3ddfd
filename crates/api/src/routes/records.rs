//! Route definitions for the `/records` resource and its images.

use axum::routing::get;
use axum::Router;

use crate::handlers::{vinyl_image, vinyl_record};
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /genres          -> list_genres
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/images     -> list_by_record
/// POST   /{id}/images     -> append
/// PATCH  /{id}/images     -> reorder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vinyl_record::list).post(vinyl_record::create))
        .route("/genres", get(vinyl_record::list_genres))
        .route(
            "/{id}",
            get(vinyl_record::get_by_id)
                .put(vinyl_record::update)
                .delete(vinyl_record::delete),
        )
        .route(
            "/{id}/images",
            get(vinyl_image::list_by_record)
                .post(vinyl_image::append)
                .patch(vinyl_image::reorder),
        )
}
