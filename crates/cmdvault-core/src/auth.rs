//! Credential checks backing the login and change-password flows.

use sqlx::SqlitePool;

use crate::error::{Result, VaultError};
use crate::model::User;
use crate::password;

/// Look up `username` and verify `password` against the stored hash.
///
/// Unknown user and wrong password both collapse to the same
/// [`VaultError::InvalidCredentials`] so responses never reveal which field
/// was wrong.
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let user: Option<User> =
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    match user {
        Some(u) if password::verify(&u.password_hash, password) => Ok(u),
        _ => Err(VaultError::InvalidCredentials),
    }
}

/// Replace the password of `user_id` after verifying the old one.
///
/// The new password must be non-empty after trimming and match its
/// confirmation. Session invalidation is the caller's responsibility — the
/// HTTP layer revokes every session of the user on success.
pub async fn change_password(
    pool: &SqlitePool,
    user_id: i64,
    old: &str,
    new: &str,
    confirm: &str,
) -> Result<()> {
    let new = new.trim();
    if new.is_empty() {
        return Err(VaultError::validation("new password must not be empty"));
    }
    if new != confirm.trim() {
        return Err(VaultError::validation("new passwords do not match"));
    }

    let user: Option<User> =
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let user = user.ok_or(VaultError::InvalidCredentials)?;

    if !password::verify(&user.password_hash, old) {
        return Err(VaultError::InvalidCredentials);
    }

    let hash = password::hash(new)?;
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
