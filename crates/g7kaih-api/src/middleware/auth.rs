//! Bearer token authentication stage.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use g7kaih_core::error::{AppError, ErrorKind};
use g7kaih_core::AppResult;

use crate::context::{Identity, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> AppResult<&str> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AppError::unauthenticated(
            "Invalid authorization header format",
        )),
    }
}

/// Verifies the access token and attaches the caller's identity to the
/// request context.
///
/// Any token failure is reported with the same message; the kind is
/// only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthenticated("Authorization header required"))?;
    let header = header
        .to_str()
        .map_err(|_| AppError::unauthenticated("Invalid authorization header format"))?;
    let token = bearer_token(header)?;

    let claims = state.tokens.verify_access(token).map_err(|e| {
        tracing::debug!(reason = %e, "Token rejected");
        AppError::with_source(ErrorKind::Authentication, "Invalid or expired token", e)
    })?;

    let identity = Identity::from(&claims);
    match request.extensions_mut().get_mut::<RequestContext>() {
        Some(ctx) => ctx.identity = Some(identity),
        None => {
            let mut ctx = RequestContext::new(String::new(), None, None);
            ctx.identity = Some(identity);
            request.extensions_mut().insert(ctx);
        }
    }

    Ok(next.run(request).await)
}
