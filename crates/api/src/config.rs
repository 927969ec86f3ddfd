use std::time::Duration;

use vinyl_cdn::CloudinaryConfig;

use crate::auth::jwt::JwtConfig;

/// Default interval between CDN outbox sweeps.
const DEFAULT_CDN_OUTBOX_INTERVAL_SECS: u64 = 30;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Cloudinary credentials; `None` runs without a CDN.
    pub cloudinary: Option<CloudinaryConfig>,
    /// How often the background worker retries pending CDN deletions.
    pub cdn_outbox_interval: Duration,
    /// Admin account created or refreshed at startup.
    pub admin: Option<AdminBootstrap>,
}

/// Credentials for the startup admin account.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `CDN_OUTBOX_INTERVAL_SECS` | `30`                    |
    /// | `ADMIN_EMAIL`              | unset                   |
    /// | `ADMIN_PASSWORD`           | unset                   |
    ///
    /// JWT settings come from [`JwtConfig::from_env`] and CDN credentials
    /// from [`CloudinaryConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on malformed numeric values so misconfiguration fails at
    /// startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cdn_outbox_interval_secs: u64 = std::env::var("CDN_OUTBOX_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_CDN_OUTBOX_INTERVAL_SECS.to_string())
            .parse()
            .expect("CDN_OUTBOX_INTERVAL_SECS must be a valid u64");
        assert!(
            cdn_outbox_interval_secs > 0,
            "CDN_OUTBOX_INTERVAL_SECS must be positive"
        );

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { email, password })
            }
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            cloudinary: CloudinaryConfig::from_env(),
            cdn_outbox_interval: Duration::from_secs(cdn_outbox_interval_secs),
            admin,
        }
    }
}
