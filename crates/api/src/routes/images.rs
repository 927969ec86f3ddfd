//! Route definitions for the `/images` resource.

use axum::routing::delete;
use axum::Router;

use crate::handlers::vinyl_image;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// DELETE /{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(vinyl_image::delete))
}
