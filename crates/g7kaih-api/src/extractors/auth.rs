//! Extractors over the [`RequestContext`] the access gate attaches.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use g7kaih_core::error::AppError;

use crate::context::{Identity, RequestContext};
use crate::error::ApiError;

/// The full request context, authenticated or not.
#[derive(Debug, Clone)]
pub struct CurrentContext(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for CurrentContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(CurrentContext)
            .ok_or_else(|| AppError::internal("Request context missing").into())
    }
}

/// Extracted authenticated user, available in handlers behind the
/// authentication stage.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Caller identity.
    pub identity: Identity,
    /// ID of the request being served.
    pub request_id: String,
}

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestContext>()
            .ok_or_else(|| AppError::unauthenticated("User not authenticated"))?;

        Ok(AuthUser {
            identity: ctx.identity()?.clone(),
            request_id: ctx.request_id.clone(),
        })
    }
}
