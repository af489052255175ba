//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use g7kaih_auth::TokenService;
use g7kaih_core::config::AppConfig;
use g7kaih_core::AppResult;

use crate::middleware::client_ip::ClientIpResolver;
use crate::middleware::cors::CorsPolicy;
use crate::middleware::ip_allowlist::IpAllowList;
use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Origin allow-list and CORS header values
    pub cors: Arc<CorsPolicy>,
    /// Backend IP allow-list
    pub ip_allowlist: Arc<IpAllowList>,
    /// Client address resolution
    pub client_ip: Arc<ClientIpResolver>,
    /// Admission controller; `None` when rate limiting is disabled
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// Builds every gate component from configuration.
    ///
    /// Fails on unparsable origin patterns, addresses, or header values so a
    /// misconfiguration is caught at startup rather than per request.
    pub fn new(config: AppConfig, tokens: TokenService) -> AppResult<Self> {
        let cors = CorsPolicy::from_config(&config.cors)?;
        let ip_allowlist = IpAllowList::new(&config.cors.allowed_backend_ips)?;
        let client_ip = ClientIpResolver::new(&config.server.trusted_proxies)?;
        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            cors: Arc::new(cors),
            ip_allowlist: Arc::new(ip_allowlist),
            client_ip: Arc::new(client_ip),
            rate_limiter,
        })
    }

    /// Builds state with a token service derived from `config.auth`.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let tokens = TokenService::new(&config.auth)?;
        Self::new(config, tokens)
    }
}
