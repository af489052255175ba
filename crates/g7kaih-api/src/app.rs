//! Application builder: wires router + gate middleware + state into an Axum app,
//! and runs it.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::{from_fn, from_fn_with_state};
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use g7kaih_core::config::AppConfig;
use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;

use crate::middleware::{cors, ip_allowlist, logging, rate_limit, request_context};
use crate::router::{RouteGroups, build_router};
use crate::state::AppState;

const X_SERVICE_NAME: HeaderName = HeaderName::from_static("x-service-name");
const X_SERVICE_VERSION: HeaderName = HeaderName::from_static("x-service-version");

/// Builds the complete Axum application with all routes and middleware.
///
/// Global stages, outermost first: tracing, request ID assignment and
/// echo, service headers, request context, access log, origin check, IP
/// allow-list, admission control. Authentication and role checks are
/// attached per route group by the router.
pub fn build_app(state: AppState, groups: RouteGroups) -> Router {
    let server = &state.config.server;
    let service_name = header_value(&server.service_name, "g7kaih-api");
    let service_version = header_value(&server.service_version, env!("CARGO_PKG_VERSION"));

    let gate = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetResponseHeaderLayer::overriding(X_SERVICE_NAME, service_name))
        .layer(SetResponseHeaderLayer::overriding(
            X_SERVICE_VERSION,
            service_version,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            request_context::attach_context,
        ))
        .layer(from_fn(logging::request_logging))
        .layer(from_fn_with_state(state.clone(), cors::validate_origin))
        .layer(from_fn_with_state(
            state.clone(),
            ip_allowlist::enforce_ip_allowlist,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            rate_limit::enforce_rate_limit,
        ));

    build_router(state, groups).layer(gate)
}

fn header_value(value: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| {
        tracing::warn!(value, "Invalid service header value, using default");
        HeaderValue::from_static(fallback)
    })
}

/// Runs the G7KAIH server with the given configuration and business routes.
///
/// Owns the rate limiter's sweeper: it is started before the listener
/// and stopped through the shutdown channel once the server has drained.
pub async fn run_server(config: AppConfig, groups: RouteGroups) -> AppResult<()> {
    tracing::info!("Starting G7KAIH server...");

    let state = AppState::from_config(config)?;
    let config = state.config.clone();

    tracing::info!(
        mode = %config.cors.mode(),
        origins = ?config.cors.resolved_origins(),
        "CORS configured"
    );
    if state.ip_allowlist.is_enabled() {
        tracing::info!(
            allowed = ?config.cors.allowed_backend_ips,
            "Backend IP allow-list enabled"
        );
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = state.rate_limiter.as_ref().map(|limiter| {
        tracing::info!(
            requests_per_minute = config.rate_limit.requests_per_minute,
            capacity = config.rate_limit.capacity(),
            "Rate limiting enabled"
        );
        limiter.spawn_sweeper(
            Duration::from_secs(config.rate_limit.sweep_interval_seconds),
            shutdown_rx.clone(),
        )
    });

    let app = build_app(state, groups);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("G7KAIH server listening on {}", addr);

    let signal_tx = shutdown_tx.clone();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = signal_tx.send(true);
    });

    let result = server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)));

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Rate limiter sweeper did not stop in time");
        }
    }

    tracing::info!("G7KAIH server shut down");
    result
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
