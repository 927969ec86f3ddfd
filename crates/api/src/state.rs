use std::sync::Arc;

use vinyl_cdn::CdnStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vinyl_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Image CDN used to destroy blobs after their rows are deleted. `None`
    /// when no credentials are configured; queued deletes then stay pending.
    pub cdn: Option<Arc<dyn CdnStore>>,
}
