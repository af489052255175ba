//! Token service failure kinds.

use thiserror::Error;

use g7kaih_core::error::{AppError, ErrorKind};

use super::claims::TokenType;

/// Why a token could not be issued or accepted.
///
/// Verification failures deliberately carry no detail beyond their kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not three base64url segments, bad JSON, missing claims, or an algorithm other than HS256.
    #[error("Malformed token")]
    Malformed,
    /// The current time is past `exp`.
    #[error("Token has expired")]
    Expired,
    /// The current time is before `nbf`.
    #[error("Token is not yet valid")]
    NotYetValid,
    /// The HMAC does not match under the service's secret.
    #[error("Invalid token signature")]
    InvalidSignature,
    /// A valid token of the wrong kind, e.g. an access token presented for refresh.
    #[error("Invalid token type: expected {expected} token, got {actual}")]
    WrongKind {
        /// Kind the operation requires.
        expected: TokenType,
        /// Kind the token carries.
        actual: TokenType,
    },
    /// Issue was called with a TTL that is not positive, or an access TTL longer than the refresh TTL.
    #[error("Invalid token TTL: {0}")]
    InvalidTtl(String),
    /// Signing failed.
    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Whether this is a verification failure (as opposed to an issuance failure).
    pub fn is_verification_failure(&self) -> bool {
        !matches!(self, Self::InvalidTtl(_) | Self::Encoding(_))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let kind = match &err {
            TokenError::InvalidTtl(_) => ErrorKind::Validation,
            TokenError::Encoding(_) => ErrorKind::Internal,
            _ => ErrorKind::Authentication,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
