//! JWT token creation with HS256 signing.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use g7kaih_entity::user::UserRole;

use super::claims::{Claims, TokenType};
use super::error::TokenError;

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Always HS256.
    header: Header,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("alg", &self.header.alg)
            .finish()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from the shared secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
        }
    }

    /// Generates an access + refresh token pair from one claims template.
    ///
    /// Both TTLs must be at least one second and the access TTL must not
    /// exceed the refresh TTL.
    pub fn generate_token_pair(
        &self,
        subject: Uuid,
        email: Option<&str>,
        role: UserRole,
        access_ttl: TimeDelta,
        refresh_ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        if access_ttl.num_seconds() < 1 || refresh_ttl.num_seconds() < 1 {
            return Err(TokenError::InvalidTtl(
                "TTLs must be at least one second".to_string(),
            ));
        }
        if access_ttl > refresh_ttl {
            return Err(TokenError::InvalidTtl(
                "access TTL exceeds refresh TTL".to_string(),
            ));
        }

        let access_exp = now + access_ttl;
        let refresh_exp = now + refresh_ttl;

        let template = Claims {
            sub: subject,
            email: email.map(str::to_string),
            role,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: 0,
            jti: Uuid::nil(),
            token_type: TokenType::Access,
        };

        let access_claims = Claims {
            exp: access_exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
            ..template.clone()
        };

        let refresh_claims = Claims {
            exp: refresh_exp.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
            ..template
        };

        let access_token = self.sign(&access_claims)?;
        let refresh_token = self.sign(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_claims.expires_at(),
            refresh_expires_at: refresh_claims.expires_at(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}
