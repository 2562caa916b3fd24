//! JWT authentication middleware for protecting API endpoints.
//!
//! The access token is read from the `Authorization: Bearer` header, or from
//! the access token cookie when no header is present. A verified identity is
//! injected into the request extensions as an `AuthContext`.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;

use ks_core::domain::value_objects::AuthContext;
use ks_core::errors::DomainError;
use ks_core::repositories::{TokenRepository, UserRepository};
use ks_core::services::{AuthService, PasswordVerifier};

use crate::handlers::error::{handle_domain_error, unauthorized_response};
use crate::session::ACCESS_TOKEN_COOKIE;

/// Turns an access token into the caller's identity
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, access_token: &str) -> Result<AuthContext, DomainError>;
}

#[async_trait]
impl<U, R, P> Authenticator for AuthService<U, R, P>
where
    U: UserRepository + 'static,
    R: TokenRepository + 'static,
    P: PasswordVerifier + 'static,
{
    async fn authenticate(&self, access_token: &str) -> Result<AuthContext, DomainError> {
        AuthService::authenticate(self, access_token).await
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    authenticator: Arc<dyn Authenticator>,
}

impl JwtAuth {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: Arc<dyn Authenticator>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let Some(token) = extract_access_token(&req) else {
                tracing::debug!(path = req.path(), "Request without access token");
                return Ok(req.into_response(unauthorized_response()).map_into_right_body());
            };

            let auth_context = match authenticator.authenticate(&token).await {
                Ok(context) => context,
                Err(error) => return Ok(req.into_response(handle_domain_error(error)).map_into_right_body()),
            };

            req.extensions_mut().insert(auth_context);

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Bearer header first, then the access token cookie
fn extract_access_token(req: &ServiceRequest) -> Option<String> {
    extract_bearer_token(req).or_else(|| {
        req.cookie(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|s| s.to_string())
}

/// Extractor for the identity injected by `JwtAuth`
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl std::ops::Deref for Authenticated {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| InternalError::from_response("Authentication required", unauthorized_response()).into());

        ready(result)
    }
}
