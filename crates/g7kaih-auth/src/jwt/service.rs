//! Token issuance, verification and refresh rotation.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::debug;
use uuid::Uuid;

use g7kaih_core::config::AuthConfig;
use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;
use g7kaih_entity::user::UserRole;

use super::claims::{Claims, TokenType};
use super::clock::{Clock, SystemClock};
use super::decoder::JwtDecoder;
use super::encoder::{JwtEncoder, TokenPair};
use super::error::TokenError;

/// Issues, verifies and refreshes HS256 token pairs.
///
/// The secret is fixed at construction and never changes. The service is
/// cheap to clone and safe to share between request tasks.
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    clock: Arc<dyn Clock>,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl TokenService {
    /// Builds the service from validated auth configuration, using the system clock.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds the service with an explicit time source.
    pub fn with_clock(config: &AuthConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        config.validate()?;
        let hours = |h: u64| {
            i64::try_from(h)
                .ok()
                .and_then(TimeDelta::try_hours)
                .ok_or_else(|| AppError::configuration(format!("token TTL of {h} hours is out of range")))
        };
        let access_ttl = hours(config.access_ttl_hours)?;
        let refresh_ttl = hours(config.refresh_ttl_hours)?;

        Ok(Self::from_secret(
            config.jwt_secret.as_bytes(),
            access_ttl,
            refresh_ttl,
            clock,
        ))
    }

    /// Builds the service from a raw secret and explicit TTLs.
    pub fn from_secret(
        secret: &[u8],
        access_ttl: TimeDelta,
        refresh_ttl: TimeDelta,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoder: JwtEncoder::new(secret),
            decoder: JwtDecoder::new(secret),
            clock,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Configured access token lifetime.
    pub fn access_ttl(&self) -> TimeDelta {
        self.access_ttl
    }

    /// Configured refresh token lifetime.
    pub fn refresh_ttl(&self) -> TimeDelta {
        self.refresh_ttl
    }

    /// Issues a pair with the configured TTLs.
    pub fn issue(
        &self,
        subject: Uuid,
        email: Option<&str>,
        role: UserRole,
    ) -> Result<TokenPair, TokenError> {
        self.issue_with_ttl(subject, email, role, self.access_ttl, self.refresh_ttl)
    }

    /// Issues a pair with explicit TTLs.
    pub fn issue_with_ttl(
        &self,
        subject: Uuid,
        email: Option<&str>,
        role: UserRole,
        access_ttl: TimeDelta,
        refresh_ttl: TimeDelta,
    ) -> Result<TokenPair, TokenError> {
        let pair = self.encoder.generate_token_pair(
            subject,
            email,
            role,
            access_ttl,
            refresh_ttl,
            self.clock.now(),
        )?;
        debug!(user_id = %subject, role = %role, "Issued token pair");
        Ok(pair)
    }

    /// Verifies a token of either kind against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.decoder.decode_token(token, self.clock.now())
    }

    /// Verifies a token and requires it to be an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        expect_kind(&claims, TokenType::Access)?;
        Ok(claims)
    }

    /// Exchanges a valid refresh token for a brand-new pair.
    ///
    /// The old tokens are not revoked; they simply run out.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token)?;
        expect_kind(&claims, TokenType::Refresh)?;
        self.issue(claims.sub, claims.email.as_deref(), claims.role)
    }
}

fn expect_kind(claims: &Claims, expected: TokenType) -> Result<(), TokenError> {
    if claims.token_type != expected {
        return Err(TokenError::WrongKind {
            expected,
            actual: claims.token_type,
        });
    }
    Ok(())
}
