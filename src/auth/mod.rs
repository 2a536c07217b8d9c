pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::AppError;
use crate::models::User;

// Re-export necessary items
pub use extractors::AuthSession;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address for the new account. Normalized to lowercase before
    /// storage and lookup.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Optional age; non-negative.
    #[validate(range(min = 0))]
    pub age: Option<i32>,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user's public profile.
    pub user: User,
    /// A freshly issued session token.
    pub token: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: i32,
    name: String,
    email: String,
    age: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    password_hash: String,
}

/// Checks a submitted (email, password) pair against the stored hash.
///
/// Returns the matching user on success. Both "no such user" and "wrong
/// password" produce the same `Unauthorized` response so the endpoint cannot
/// be used to enumerate accounts. No side effects.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let email = email.to_lowercase();

    let row: Option<CredentialRow> = sqlx::query_as(
        "SELECT id, name, email, age, created_at, updated_at, password_hash \
         FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(password, &row.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    Ok(User {
        id: row.id,
        name: row.name,
        email: row.email,
        age: row.age,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
