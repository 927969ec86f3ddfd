pub mod auth;
pub mod health;
pub mod images;
pub mod records;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                      register (public)
/// /auth/login                         login (public)
///
/// /records                            list (public), create (admin)
/// /records/genres                     distinct genres (public)
/// /records/{id}                       get (public), update, delete (admin)
/// /records/{id}/images                list (public), append, reorder (admin)
///
/// /images/{id}                        delete (admin)
///
/// /uploads/delete                     destroy an unattached CDN upload (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/records", records::router())
        .nest("/images", images::router())
        .nest("/uploads", uploads::router())
}
