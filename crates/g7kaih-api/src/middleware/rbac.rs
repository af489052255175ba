//! Role check stage.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use g7kaih_auth::RoleSet;
use g7kaih_core::error::AppError;

use crate::context::RequestContext;
use crate::error::ApiError;

/// Admits the request only if the authenticated role is in `roles`.
///
/// Mounted with `from_fn_with_state(RoleSet::TEACHERS, require_roles)`
/// inside an authentication layer.
pub async fn require_roles(
    State(roles): State<RoleSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let role = request
        .extensions()
        .get::<RequestContext>()
        .ok_or_else(|| AppError::unauthenticated("User not authenticated"))?
        .role()?;

    if let Err(err) = roles.check(role) {
        tracing::debug!(role = %role, allowed = %roles, "Role not permitted");
        return Err(err.into());
    }

    Ok(next.run(request).await)
}
