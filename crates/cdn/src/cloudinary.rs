//! Cloudinary destroy API.
//!
//! Requests are signed as described by Cloudinary's authentication scheme:
//! the parameters (minus `api_key` and the signature itself) are sorted,
//! joined as `k=v&k=v`, suffixed with the API secret and hashed with
//! SHA-256.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{CdnError, CdnStore};

/// Base URL of the Cloudinary REST API.
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// HTTP request timeout for a single destroy call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials for one Cloudinary cloud.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Overridable for tests against a local stub.
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load credentials from environment variables.
    ///
    /// | Env var                  | Required |
    /// |--------------------------|----------|
    /// | `CLOUDINARY_CLOUD_NAME`  | yes      |
    /// | `CLOUDINARY_API_KEY`     | yes      |
    /// | `CLOUDINARY_API_SECRET`  | yes      |
    /// | `CLOUDINARY_API_BASE`    | no       |
    ///
    /// Returns `None` unless all three required variables are set and
    /// non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
            api_base: var("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }
}

/// Body of a destroy response.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// [`CdnStore`] backed by the Cloudinary destroy endpoint.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    /// Create a store with a pre-configured HTTP client.
    pub fn new(config: CloudinaryConfig) -> Result<Self, CdnError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    fn destroy_url(&self) -> String {
        format!(
            "{}/{}/image/destroy",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl CdnStore for CloudinaryStore {
    async fn delete(&self, public_id: &str) -> Result<(), CdnError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", &timestamp.to_string())],
            &self.config.api_secret,
        );

        let payload = serde_json::json!({
            "public_id": public_id,
            "timestamp": timestamp,
            "api_key": self.config.api_key,
            "signature": signature,
            "signature_algorithm": "sha256",
        });

        let response = self
            .client
            .post(self.destroy_url())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CdnError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: DestroyResponse = response.json().await?;
        if is_destroyed(&body.result) {
            tracing::debug!(public_id, result = %body.result, "CDN blob destroyed");
            Ok(())
        } else {
            Err(CdnError::Rejected(body.result))
        }
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

/// Compute the hex SHA-256 request signature.
///
/// `params` must not include `api_key`, `signature` or
/// `signature_algorithm`; order does not matter.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `"not found"` means the blob is already gone, which is what we wanted.
fn is_destroyed(result: &str) -> bool {
    matches!(result, "ok" | "not found")
}
