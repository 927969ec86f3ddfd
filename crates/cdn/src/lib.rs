//! Image CDN client.
//!
//! Images are uploaded by the browser straight to the CDN; the API only ever
//! needs to destroy blobs once the rows pointing at them are gone.
//! [`CdnStore`] is that one operation and [`CloudinaryStore`] implements it
//! against the real service.

use async_trait::async_trait;

pub mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for CDN requests.
#[derive(Debug, thiserror::Error)]
pub enum CdnError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The CDN returned a non-2xx status code.
    #[error("CDN returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The CDN answered 2xx but did not confirm the delete.
    #[error("CDN rejected the delete: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// CdnStore
// ---------------------------------------------------------------------------

/// Destroys image blobs on the CDN.
#[async_trait]
pub trait CdnStore: Send + Sync {
    /// Destroy the blob identified by `public_id`.
    ///
    /// Deleting a blob that is already gone succeeds, so callers can retry
    /// freely.
    async fn delete(&self, public_id: &str) -> Result<(), CdnError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
