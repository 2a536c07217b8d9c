//! Session token registry.
//!
//! A token is valid if and only if its exact string is still present in the
//! `sessions` table for its owner. Validity is revocable state, not a
//! property of the signature: logout deletes the row and the auth gate stops
//! accepting the token even though its signature would still verify.
//!
//! Every mutation here is a single-row `INSERT`/`DELETE`, so concurrent
//! logins and logouts for the same user never overwrite each other the way a
//! read-modify-write over a token array would.

use crate::auth::token::TokenSigner;
use crate::error::AppError;
use sqlx::PgPool;

/// Mints a token for `user_id` and records it as an active session.
///
/// Each call adds one row; a user may hold any number of concurrent sessions
/// (one per device).
pub async fn issue(pool: &PgPool, signer: &TokenSigner, user_id: i32) -> Result<String, AppError> {
    let token = signer.issue(user_id)?;

    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2) ON CONFLICT (token) DO NOTHING")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Membership probe used by the auth gate: is this exact token string still
/// an active session for this user?
pub async fn is_active(pool: &PgPool, user_id: i32, token: &str) -> Result<bool, AppError> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT user_id FROM sessions WHERE token = $1 AND user_id = $2")
            .bind(token)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Single logout: removes exactly one session. Other sessions for the same
/// user stay valid. Idempotent: deleting an already-removed token is a no-op.
pub async fn revoke(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1 AND user_id = $2")
        .bind(token)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Global logout: clears every session for the user. All devices must
/// re-authenticate. Idempotent.
pub async fn revoke_all(pool: &PgPool, user_id: i32) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
