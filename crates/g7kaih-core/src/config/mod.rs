//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files plus `G7KAIH__`-prefixed environment variables. Each
//! sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::cors::{CorsConfig, CorsMode};
pub use self::logging::LoggingConfig;
pub use self::rate_limit::RateLimitConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Environment keys that hold comma-separated lists.
const LIST_KEYS: [&str; 5] = [
    "server.trusted_proxies",
    "cors.custom_origins",
    "cors.allowed_frontend_ips",
    "cors.allowed_backend_ips",
    "cors.allowed_headers",
];

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration
/// (default.toml + environment overlay + environment variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Cross-origin and IP allow-list settings.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Admission control settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `{dir}/default.toml` with an environment-specific overlay
    /// `{dir}/{env}.toml` and environment variables prefixed with `G7KAIH__`
    /// (e.g. `G7KAIH__AUTH__JWT_SECRET`). Both files are optional.
    pub fn load(dir: &str, env: &str) -> AppResult<Self> {
        let mut environment = config::Environment::with_prefix("G7KAIH")
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .try_parsing(true);
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }

        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the gateway cannot run safely with.
    pub fn validate(&self) -> AppResult<()> {
        self.auth.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}
