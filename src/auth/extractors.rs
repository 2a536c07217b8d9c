use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The identity resolved by `AuthMiddleware` for the current request.
///
/// Carries both the user id and the exact token string that was presented,
/// because single logout must remove precisely that session and no other.
///
/// If no session is present in the extensions (e.g. the middleware did not
/// run on this route), the extractor fails with `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i32,
    pub token: String,
}

impl FromRequest for AuthSession {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthSession>().cloned() {
            Some(session) => ready(Ok(session)),
            None => {
                // Only reachable when a handler is registered outside the
                // auth gate by mistake; Unauthorized is the safe default.
                let err = AppError::Unauthorized(
                    "No session found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
