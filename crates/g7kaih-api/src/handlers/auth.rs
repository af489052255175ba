//! Auth handlers: refresh, me.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use g7kaih_core::error::{AppError, ErrorKind};

use crate::dto::request::RefreshRequest;
use crate::dto::response::{ApiResponse, MeResponse, TokenResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The old pair is not revoked.
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let Json(req) = body.map_err(|e| AppError::validation(e.body_text()))?;
    if req.refresh_token.trim().is_empty() {
        return Err(AppError::validation("refresh_token is required").into());
    }

    let pair = state.tokens.refresh(&req.refresh_token).map_err(|e| {
        tracing::debug!(reason = %e, "Refresh rejected");
        AppError::with_source(
            ErrorKind::Authentication,
            "Invalid or expired refresh token",
            e,
        )
    })?;

    Ok(Json(ApiResponse::ok(TokenResponse::from(pair))))
}

/// GET /api/v1/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse {
        user_id: auth.subject,
        email: auth.email.clone(),
        role: auth.role,
    }))
}
