//! JWT token validation.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use super::claims::Claims;
use super::error::TokenError;

/// Validates HS256 tokens and checks their lifetime against a supplied time.
///
/// Signature comparison is done by `jsonwebtoken`'s HMAC verifier, which
/// compares in constant time. Expiry and not-before are checked here, with
/// no leeway, so the caller's clock is authoritative.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Same checks with the signature ignored, to classify decode failures.
    unverified: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from the shared secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub"]);

        let mut unverified = validation.clone();
        unverified.insecure_disable_signature_validation();

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            unverified,
        }
    }

    /// Decodes a token of either kind and checks it is live at `now`.
    ///
    /// The signature is verified before any time check, so a tampered
    /// token is reported as such even when it is also expired.
    pub fn decode_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| self.classify(token, e.kind()))?
            .claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        if claims.is_premature_at(now) {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }

    /// Maps a `jsonwebtoken` failure onto a token error.
    ///
    /// A signature segment that is not valid base64 surfaces as a decode
    /// error. If the header and claims are sound on their own, the fault is
    /// in the signature and is reported as `InvalidSignature`.
    fn classify(&self, token: &str, kind: &JwtErrorKind) -> TokenError {
        match kind {
            JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ if self.is_sound_apart_from_signature(token) => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }

    fn is_sound_apart_from_signature(&self, token: &str) -> bool {
        decode_header(token).is_ok_and(|header| header.alg == Algorithm::HS256)
            && decode::<Claims>(token, &self.decoding_key, &self.unverified).is_ok()
    }
}
