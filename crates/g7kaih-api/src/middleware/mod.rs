//! Axum middleware stack.
//!
//! Stages of the access gate, in the order a request meets them:
//! `request_context`, `cors`, `ip_allowlist`, `rate_limit`, then per route
//! group `auth` and `rbac`.

pub mod auth;
pub mod client_ip;
pub mod cors;
pub mod ip_allowlist;
pub mod logging;
pub mod rate_limit;
pub mod rbac;
pub mod request_context;
