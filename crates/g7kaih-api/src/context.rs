//! Per-request context attached by the access gate.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use g7kaih_auth::Claims;
use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;
use g7kaih_entity::user::UserRole;

/// The authenticated caller, copied from verified access-token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The user's ID (token subject).
    pub subject: Uuid,
    /// Email, when the token carries one.
    pub email: Option<String>,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Context for the current request.
///
/// Inserted into request extensions right after tagging, owned by that
/// one request. The identity is only present once the authentication
/// stage has run and succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Value of `X-Request-ID` (inbound or generated).
    pub request_id: String,
    /// Resolved client address, if the connection exposes one.
    pub client_ip: Option<IpAddr>,
    /// Declared `Origin` header.
    pub origin: Option<String>,
    /// Authenticated caller.
    pub identity: Option<Identity>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates an unauthenticated context.
    pub fn new(request_id: String, client_ip: Option<IpAddr>, origin: Option<String>) -> Self {
        Self {
            request_id,
            client_ip,
            origin,
            identity: None,
            request_time: Utc::now(),
        }
    }

    /// The authenticated caller, or `Unauthenticated`.
    pub fn identity(&self) -> AppResult<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| AppError::unauthenticated("User not authenticated"))
    }

    /// Subject ID of the authenticated caller.
    pub fn subject_id(&self) -> AppResult<Uuid> {
        self.identity().map(|i| i.subject)
    }

    /// Role of the authenticated caller.
    pub fn role(&self) -> AppResult<UserRole> {
        self.identity().map(|i| i.role)
    }

    /// Key under which the admission controller tracks this client.
    pub fn client_key(&self) -> String {
        self.client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
