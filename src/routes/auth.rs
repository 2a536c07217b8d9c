use crate::{
    auth::{
        hash_password, verify_credentials, AuthResponse, AuthSession, LoginRequest,
        RegisterRequest, TokenSigner,
    },
    email::Mailer,
    error::AppError,
    models::User,
    sessions,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account, issues a first session token, and queues a
/// welcome email.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    signer: web::Data<TokenSigner>,
    mailer: web::Data<dyn Mailer>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    let email = register_data.email.to_lowercase();

    // Check if email already exists
    let existing_user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    // Hash password before anything touches storage
    let password_hash = hash_password(&register_data.password)?;

    // Insert new user
    let user: User = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash, age) VALUES ($1, $2, $3, $4) \
         RETURNING id, name, email, age, created_at, updated_at",
    )
    .bind(&register_data.name)
    .bind(&email)
    .bind(&password_hash)
    .bind(register_data.age)
    .fetch_one(&**pool)
    .await?;

    mailer.send_welcome(&user.email, &user.name);

    // Issue and record the first session token
    let token = sessions::issue(&pool, &signer, user.id).await?;

    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Login user
///
/// Authenticates a credential pair and issues a fresh session token. Each
/// login adds a session; existing sessions on other devices stay valid.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    signer: web::Data<TokenSigner>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let user = verify_credentials(&pool, &login_data.email, &login_data.password).await?;
    let token = sessions::issue(&pool, &signer, user.id).await?;

    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// Logout current session
///
/// Revokes exactly the token this request authenticated with; sessions on
/// other devices remain valid. Idempotent.
#[post("/logout")]
pub async fn logout(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    sessions::revoke(&pool, session.user_id, &session.token).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Logout all sessions
///
/// Clears the caller's entire session registry; every device must
/// re-authenticate. Idempotent.
#[post("/logout_all")]
pub async fn logout_all(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    sessions::revoke_all(&pool, session.user_id).await?;

    Ok(HttpResponse::Ok().finish())
}
