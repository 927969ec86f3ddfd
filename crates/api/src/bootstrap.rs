//! Startup tasks that seed required data.

use anyhow::Context;
use sqlx::PgPool;
use vinyl_core::roles::ROLE_ADMIN;
use vinyl_core::validation;
use vinyl_db::models::user::CreateUser;
use vinyl_db::repositories::UserRepo;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::AdminBootstrap;

/// Create the configured admin account, or reset its password and role if it
/// already exists.
pub async fn ensure_admin(pool: &PgPool, admin: &AdminBootstrap) -> anyhow::Result<()> {
    let email = validation::email(&admin.email).context("ADMIN_EMAIL is not a valid address")?;
    validate_password_strength(&admin.password).context("ADMIN_PASSWORD is too short")?;

    let password_hash = hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let user = UserRepo::upsert(
        pool,
        &CreateUser {
            email,
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await
    .context("Failed to upsert admin user")?;

    tracing::info!(user_id = user.id, email = %user.email, "Admin account ready");
    Ok(())
}
