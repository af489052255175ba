//! Admission control configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Per-client token bucket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the admission stage runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Sustained rate; the bucket refills at `requests_per_minute / 60` tokens per second.
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    /// Bucket capacity. Defaults to half the per-minute rate (at least 1).
    #[serde(default)]
    pub burst: Option<u32>,
    /// Interval between full clears of the bucket table.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            requests_per_minute: default_rpm(),
            burst: None,
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl RateLimitConfig {
    /// Effective bucket capacity.
    pub fn capacity(&self) -> u32 {
        self.burst
            .unwrap_or(self.requests_per_minute / 2)
            .max(1)
    }

    /// Effective refill rate in tokens per second.
    pub fn refill_per_second(&self) -> f64 {
        f64::from(self.requests_per_minute) / 60.0
    }

    /// Rejects an enabled limiter that could never admit anything.
    pub fn validate(&self) -> AppResult<()> {
        if self.enabled && self.requests_per_minute == 0 {
            return Err(AppError::configuration(
                "rate_limit.requests_per_minute must be positive when enabled",
            ));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "rate_limit.sweep_interval_seconds must be positive",
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_rpm() -> u32 {
    60
}

fn default_sweep_interval() -> u64 {
    60
}
