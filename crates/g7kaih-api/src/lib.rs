//! # g7kaih-api
//!
//! HTTP layer for the G7KAIH backend built on Axum.
//!
//! Every request passes through the access gate before reaching a handler:
//! request tagging, origin validation, IP allow-listing, admission control,
//! then (per route group) token authentication and a role check. Business
//! handlers plug in through [`router::RouteGroups`] and read the caller's
//! identity from the [`context::RequestContext`] the gate attaches.

pub mod app;
pub mod context;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use context::{Identity, RequestContext};
pub use error::ApiError;
pub use router::RouteGroups;
pub use state::AppState;
