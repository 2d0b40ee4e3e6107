// src/middleware/auth_extractor.rs - bearer token gate for protected scopes
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::{ready, Ready};
use log::debug;

use crate::error::AppError;
use crate::services::JwtKeys;

/// User proven by the bearer token, inserted into request extensions by [`RequireAuth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

/// Rejects requests without a valid `Authorization: Bearer <jwt>` header.
///
/// - no header, or nothing after `Bearer ` → 401 "No token provided"
/// - another scheme, bad signature, expired, or not a JWT → 401 "Invalid token"
pub struct RequireAuth {
    keys: Rc<JwtKeys>,
}

impl RequireAuth {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys: Rc::new(keys) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
            keys: self.keys.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    keys: Rc<JwtKeys>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let keys = self.keys.clone();

        Box::pin(async move {
            match authenticate(req.request(), &keys) {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

fn authenticate(req: &HttpRequest, keys: &JwtKeys) -> Result<AuthenticatedUser, AppError> {
    let header = match req.headers().get("authorization") {
        Some(value) => value.to_str().map_err(|_| AppError::unauthorized("Invalid token"))?,
        None => return Err(AppError::unauthorized("No token provided")),
    };
    let header = header.trim();
    if header.is_empty() || header == "Bearer" {
        return Err(AppError::unauthorized("No token provided"));
    }
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid token"))?
        .trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("No token provided"));
    }

    let claims = keys.verify(token).map_err(|e| {
        debug!("token rejected: {}", e);
        AppError::unauthorized("Invalid token")
    })?;
    Ok(AuthenticatedUser { user_id: claims.id })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(*user)),
            None => ready(Err(AppError::unauthorized("No token provided").into())),
        }
    }
}
