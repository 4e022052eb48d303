//! Startup seeding of the admin account.

use crate::auth::password::hash_password;
use crate::state::DbState;
use anyhow::{Context, Result};
use vidmod_core::models::{normalize_email, NewUser, RoleName};
use vidmod_core::Config;

/// Create the configured admin when its email is not registered yet.
/// Returns true when an account was created.
pub async fn seed_admin(config: &Config, db: &DbState) -> Result<bool> {
    let Some((email, password)) = config.seed_admin() else {
        return Ok(false);
    };
    let email = normalize_email(email);

    if db
        .users
        .find_by_email(&email)
        .await
        .context("Failed to look up seed admin")?
        .is_some()
    {
        tracing::debug!(email = %email, "Seed admin already exists");
        return Ok(false);
    }

    let password_hash = hash_password(password.to_string()).await?;
    let admin = db
        .users
        .create(NewUser {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email,
            password_hash,
            role: RoleName::Admin,
            is_active: true,
            is_email_verified: true,
        })
        .await
        .context("Failed to create seed admin")?;

    tracing::info!(user_id = %admin.id, email = %admin.email, "Seed admin created");
    Ok(true)
}
