use crate::{
    auth::{hash_password, AuthSession},
    email::Mailer,
    error::AppError,
    models::{User, UserUpdate},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Uploads are capped at 1 MiB.
const MAX_AVATAR_BYTES: usize = 1024 * 1024;

const USER_COLUMNS: &str = "id, name, email, age, created_at, updated_at";

/// Maps the leading bytes of an upload to a served content type.
/// Only PNG and JPEG are accepted; decoding/resizing stays outside the core.
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else {
        None
    }
}

async fn fetch_user(pool: &PgPool, user_id: i32) -> Result<User, AppError> {
    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    user.ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Read own profile.
#[get("/me")]
pub async fn get_me(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let user = fetch_user(&pool, session.user_id).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Update own profile, allow-listed fields only.
///
/// The payload schema is `UserUpdate`; an unknown key fails deserialization
/// (400) before this handler runs, so a mixed valid/invalid payload never
/// applies partially. A password change goes through the hash-and-store path.
#[patch("/me")]
pub async fn update_me(
    pool: web::Data<PgPool>,
    update: web::Json<UserUpdate>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    if update.is_empty() {
        let user = fetch_user(&pool, session.user_id).await?;
        return Ok(HttpResponse::Ok().json(user));
    }

    let email = update.email.as_ref().map(|e| e.to_lowercase());

    // A changed email must stay unique across accounts.
    if let Some(email) = &email {
        let taken: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(session.user_id)
                .fetch_optional(&**pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("Email already registered".into()));
        }
    }

    let password_hash = match &update.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    // Build the SET list over the fields actually present, in bind order.
    let mut sets: Vec<String> = Vec::new();
    let mut param_count = 1;
    if update.name.is_some() {
        sets.push(format!("name = ${}", param_count));
        param_count += 1;
    }
    if email.is_some() {
        sets.push(format!("email = ${}", param_count));
        param_count += 1;
    }
    if password_hash.is_some() {
        sets.push(format!("password_hash = ${}", param_count));
        param_count += 1;
    }
    if update.age.is_some() {
        sets.push(format!("age = ${}", param_count));
        param_count += 1;
    }

    let sql = format!(
        "UPDATE users SET {}, updated_at = NOW() WHERE id = ${} RETURNING {}",
        sets.join(", "),
        param_count,
        USER_COLUMNS
    );

    let mut query = sqlx::query_as::<_, User>(&sql);
    if let Some(name) = &update.name {
        query = query.bind(name);
    }
    if let Some(email) = &email {
        query = query.bind(email);
    }
    if let Some(password_hash) = &password_hash {
        query = query.bind(password_hash);
    }
    if let Some(age) = update.age {
        query = query.bind(age);
    }
    let user = query.bind(session.user_id).fetch_one(&**pool).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Delete own account.
///
/// Owned tasks and active sessions go with it (FK cascade), and a
/// cancellation email is queued. Returns the removed profile.
#[delete("/me")]
pub async fn delete_me(
    pool: web::Data<PgPool>,
    mailer: web::Data<dyn Mailer>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let user = fetch_user(&pool, session.user_id).await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(session.user_id)
        .execute(&**pool)
        .await?;

    mailer.send_cancellation(&user.email, &user.name);

    Ok(HttpResponse::Ok().json(user))
}

/// Upload an avatar for the authenticated user.
///
/// Accepts a raw PNG or JPEG body of at most 1 MiB; anything else is a 400.
/// The blob is stored as-is.
#[post("/me/avatar")]
pub async fn upload_avatar(
    pool: web::Data<PgPool>,
    body: web::Bytes,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    if body.len() > MAX_AVATAR_BYTES {
        return Err(AppError::BadRequest("Avatar exceeds 1MB limit".into()));
    }
    if sniff_image(&body).is_none() {
        return Err(AppError::BadRequest(
            "Invalid file type. Only jpg/jpeg/png supported.".into(),
        ));
    }

    sqlx::query("UPDATE users SET avatar = $1, updated_at = NOW() WHERE id = $2")
        .bind(body.as_ref())
        .bind(session.user_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().finish())
}

/// Fetch any user's avatar by user id. Public: no token required.
#[get("/{id}/avatar")]
pub async fn get_avatar(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as("SELECT avatar FROM users WHERE id = $1")
        .bind(user_id.into_inner())
        .fetch_optional(&**pool)
        .await?;

    let avatar = match row {
        Some((Some(avatar),)) => avatar,
        _ => return Err(AppError::NotFound("Avatar not found".into())),
    };

    let content_type = sniff_image(&avatar).unwrap_or("application/octet-stream");

    Ok(HttpResponse::Ok().content_type(content_type).body(avatar))
}

/// Remove the authenticated user's avatar. 404 when none is set.
#[delete("/me/avatar")]
pub async fn delete_avatar(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query(
        "UPDATE users SET avatar = NULL, updated_at = NOW() \
         WHERE id = $1 AND avatar IS NOT NULL",
    )
    .bind(session.user_id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Avatar not found".into()));
    }

    Ok(HttpResponse::Ok().finish())
}
