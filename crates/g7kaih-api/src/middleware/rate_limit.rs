//! Token bucket rate limiter middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use g7kaih_core::config::RateLimitConfig;
use g7kaih_core::error::AppError;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::state::AppState;

/// In-memory, per-client token bucket rate limiter.
///
/// Buckets are created lazily at full capacity. The table lookup only
/// holds a shard lock long enough to clone the bucket handle; the bucket
/// itself is mutated under its own lock, so different clients never wait
/// on each other.
#[derive(Debug)]
pub struct RateLimiter {
    /// Client key → bucket.
    buckets: DashMap<String, Arc<Mutex<TokenBucket>>>,
    /// Maximum tokens per bucket.
    capacity: f64,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn try_take(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl RateLimiter {
    /// Creates a limiter with `capacity` tokens refilled at `refill_rate` per second.
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: f64::from(capacity.max(1)),
            refill_rate: refill_rate.max(0.0),
        }
    }

    /// Creates a limiter from configuration: burst capacity, `rpm / 60` tokens per second.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity(), config.refill_per_second())
    }

    /// Takes one token for `key`; `false` means the request must be rejected.
    pub fn allow(&self, key: &str) -> bool {
        let bucket = match self.buckets.get(key) {
            Some(entry) => Arc::clone(entry.value()),
            None => Arc::clone(
                self.buckets
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::full(self.capacity))))
                    .value(),
            ),
        };

        bucket.lock().try_take(self.capacity, self.refill_rate)
    }

    /// Drops every bucket. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let count = self.buckets.len();
        self.buckets.clear();
        count
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Spawns the eviction task: every `interval` all buckets are cleared.
    ///
    /// The task exits when `shutdown` flips to `true` or its sender is dropped.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let cleared = limiter.clear();
                        tracing::debug!(cleared, "Rate limiter buckets cleared");
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            tracing::debug!("Rate limiter sweeper stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}

/// Admission control stage. Keys on the resolved client address.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        let ctx = request.extensions().get::<RequestContext>();
        let key = ctx
            .map(RequestContext::client_key)
            .unwrap_or_else(|| "unknown".to_string());

        if !limiter.allow(&key) {
            tracing::warn!(
                client = %key,
                request_id = ctx.map(|c| c.request_id.as_str()).unwrap_or_default(),
                "Rate limit exceeded"
            );
            return Err(AppError::rate_limited("Too many requests").into());
        }
    }

    Ok(next.run(request).await)
}
