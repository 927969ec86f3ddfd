//! Request extractors with the API's JSON error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] on request bodies.
///
/// Malformed JSON, a wrong content type, and unknown or missing fields are
/// rejected as `400 BAD_REQUEST` in the usual `{ "error", "code" }` shape
/// before the handler runs.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
