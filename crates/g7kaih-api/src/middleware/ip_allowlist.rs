//! Backend IP allow-list stage.

use std::collections::HashSet;
use std::net::IpAddr;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

use super::client_ip::parse_ip;

use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;

/// Addresses allowed to reach the backend. Empty means the check is off.
#[derive(Debug, Clone, Default)]
pub struct IpAllowList {
    allowed: HashSet<IpAddr>,
}

impl IpAllowList {
    /// Parses `cors.allowed_backend_ips`.
    pub fn new<I, S>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = entries
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| parse_ip(s.as_ref(), "cors.allowed_backend_ips"))
            .collect::<Result<_, _>>()?;
        Ok(Self { allowed })
    }

    pub fn is_enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    /// Whether a client may pass. An unknown address only passes when the list is off.
    pub fn permits(&self, ip: Option<IpAddr>) -> bool {
        if !self.is_enabled() {
            return true;
        }
        ip.is_some_and(|ip| self.allowed.contains(&ip.to_canonical()))
    }
}

/// Rejects clients outside the allow-list with 403.
pub async fn enforce_ip_allowlist(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.ip_allowlist.is_enabled() {
        let ctx = request.extensions().get::<RequestContext>();
        let client_ip = ctx.and_then(|c| c.client_ip);
        if !state.ip_allowlist.permits(client_ip) {
            tracing::warn!(
                client_ip = ?client_ip,
                request_id = ctx.map(|c| c.request_id.as_str()).unwrap_or_default(),
                "Rejected request from address outside allow-list"
            );
            return Err(AppError::forbidden_origin("Access denied from this IP").into());
        }
    }

    Ok(next.run(request).await)
}
