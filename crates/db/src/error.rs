use vinyl_core::error::CoreError;

/// Error returned by repository operations that validate input inside their
/// transaction (e.g. a reorder checked against the locked image set).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The request was rejected by a domain rule. Nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed. The transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
