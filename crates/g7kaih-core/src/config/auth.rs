//! Token signing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Token signing and lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256). Must be set.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token TTL in hours.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_hours: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_hours: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
        }
    }
}

impl AuthConfig {
    /// Checks the secret is present and the TTLs are usable.
    pub fn validate(&self) -> AppResult<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.access_ttl_hours == 0 || self.refresh_ttl_hours == 0 {
            return Err(AppError::configuration("token TTLs must be positive"));
        }
        if self.access_ttl_hours > self.refresh_ttl_hours {
            return Err(AppError::configuration(
                "auth.access_ttl_hours must not exceed auth.refresh_ttl_hours",
            ));
        }
        Ok(())
    }
}

fn default_access_ttl() -> u64 {
    24
}

fn default_refresh_ttl() -> u64 {
    24 * 7
}
