//! Request tagging: builds the [`RequestContext`] every later stage reads.

use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::middleware::Next;
use axum::response::Response;

use crate::context::RequestContext;
use crate::state::AppState;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Attaches a fresh context with the request ID, client address and origin.
///
/// Runs inside the layers that assign and echo `X-Request-ID`, so the
/// header is always present by the time it gets here. Never fails.
pub async fn attach_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let client_ip = state
        .client_ip
        .resolve_request(request.extensions(), request.headers());
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id, client_ip, origin));

    next.run(request).await
}
