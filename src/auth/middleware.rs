use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::extractors::AuthSession;
use crate::auth::token::TokenSigner;
use crate::error::AppError;
use crate::sessions;

/// The hard authentication gate.
///
/// Every protected request must carry `Authorization: Bearer <token>` where
/// the token both verifies against the signing secret and is still present in
/// the session registry for its subject. A signed-but-revoked token (logout,
/// logoutAll, deleted account) is rejected exactly like a forged one. On
/// success the resolved identity and the matched token are attached to the
/// request; no downstream handler runs on failure.
pub struct AuthMiddleware;

fn is_public(req: &ServiceRequest) -> bool {
    let path = req.path();
    path == "/health"
        || path.starts_with("/api/auth/login")
        || path.starts_with("/api/auth/register")
        // Avatar fetch by user id is public; uploads and deletes are not.
        || (req.method() == Method::GET
            && path.starts_with("/api/users/")
            && path.ends_with("/avatar"))
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the session-registry check suspends before the inner call.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(&req) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = Rc::clone(&self.service);
        let signer = req.app_data::<web::Data<TokenSigner>>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned);

        Box::pin(async move {
            let (signer, pool) = match (signer, pool) {
                (Some(signer), Some(pool)) => (signer, pool),
                _ => {
                    return Err(AppError::InternalServerError(
                        "auth state not configured".into(),
                    )
                    .into())
                }
            };

            let token = match bearer {
                Some(token) => token,
                None => return Err(AppError::Unauthorized("Missing token".into()).into()),
            };

            // Signature and expiry first; pure computation.
            let claims = signer.decode(&token)?;

            // Then the one persistence read: the token must still be an
            // active session. Signature validity alone is not enough.
            if !sessions::is_active(pool.get_ref(), claims.sub, &token).await? {
                return Err(AppError::Unauthorized("Invalid token".into()).into());
            }

            req.extensions_mut().insert(AuthSession {
                user_id: claims.sub,
                token,
            });

            service.call(req).await
        })
    }
}
