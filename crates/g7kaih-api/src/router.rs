//! Route definitions for the G7KAIH HTTP API.
//!
//! Business routes are supplied by the caller grouped by access tier and
//! mounted under `/api/v1`. Each tier gets the authentication and role
//! stages it needs; the global stages are added in [`crate::app`].

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use g7kaih_auth::RoleSet;

use crate::handlers;
use crate::middleware::{auth, rbac};
use crate::state::AppState;

/// Business routes grouped by who may call them.
///
/// Paths are relative to `/api/v1`.
#[derive(Default)]
pub struct RouteGroups {
    /// No authentication.
    pub public: Router<AppState>,
    /// Any authenticated role.
    pub authenticated: Router<AppState>,
    /// `admin`, `guru`, `guruwali`.
    pub teacher: Router<AppState>,
    /// `admin`, `guruwali`.
    pub homeroom: Router<AppState>,
    /// `orangtua`.
    pub parent: Router<AppState>,
    /// `admin`.
    pub admin: Router<AppState>,
}

impl RouteGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, routes: Router<AppState>) -> Self {
        self.public = self.public.merge(routes);
        self
    }

    pub fn authenticated(mut self, routes: Router<AppState>) -> Self {
        self.authenticated = self.authenticated.merge(routes);
        self
    }

    pub fn teacher(mut self, routes: Router<AppState>) -> Self {
        self.teacher = self.teacher.merge(routes);
        self
    }

    pub fn homeroom(mut self, routes: Router<AppState>) -> Self {
        self.homeroom = self.homeroom.merge(routes);
        self
    }

    pub fn parent(mut self, routes: Router<AppState>) -> Self {
        self.parent = self.parent.merge(routes);
        self
    }

    pub fn admin(mut self, routes: Router<AppState>) -> Self {
        self.admin = self.admin.merge(routes);
        self
    }
}

/// Build the router with the built-in endpoints and the given business routes.
///
/// The global gate stages are not applied here; see [`crate::app::build_app`].
pub fn build_router(state: AppState, groups: RouteGroups) -> Router {
    let public = groups.public.merge(auth_public_routes());
    let authenticated = groups.authenticated.merge(auth_me_routes());

    let api_routes = Router::new()
        .merge(public)
        .merge(authenticated_tier(&state, authenticated))
        .merge(role_tier(&state, groups.teacher, RoleSet::TEACHERS))
        .merge(role_tier(&state, groups.homeroom, RoleSet::HOMEROOM))
        .merge(role_tier(&state, groups.parent, RoleSet::PARENTS))
        .merge(role_tier(&state, groups.admin, RoleSet::ADMIN_ONLY));

    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Wraps routes in the authentication stage.
fn authenticated_tier(state: &AppState, routes: Router<AppState>) -> Router<AppState> {
    routes.layer(from_fn_with_state(state.clone(), auth::authenticate))
}

/// Wraps routes in authentication followed by a role check.
fn role_tier(state: &AppState, routes: Router<AppState>, roles: RoleSet) -> Router<AppState> {
    // Layers run outermost-last: authenticate, then require_roles.
    routes
        .layer(from_fn_with_state(roles, rbac::require_roles))
        .layer(from_fn_with_state(state.clone(), auth::authenticate))
}

/// Token refresh (public).
fn auth_public_routes() -> Router<AppState> {
    Router::new().route("/auth/refresh", post(handlers::auth::refresh))
}

/// Current identity (authenticated).
fn auth_me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(handlers::auth::me))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
