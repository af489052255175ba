//! Origin validation and CORS response headers.
//!
//! Allowed origins are echoed back, never answered with `*`. A disallowed
//! origin is still forwarded to the handler, just without permission
//! headers, and the browser enforces the block.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN,
    VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use regex::Regex;

use g7kaih_core::config::CorsConfig;
use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;

use crate::state::AppState;

/// One allow-list entry.
#[derive(Debug, Clone)]
enum OriginPattern {
    Exact(String),
    /// `*` compiled to `.*`, anchored at both ends.
    Wildcard(Regex),
}

impl OriginPattern {
    fn compile(entry: &str) -> AppResult<Self> {
        if !entry.contains('*') {
            return Ok(Self::Exact(entry.to_string()));
        }
        let body = entry
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let re = Regex::new(&format!("^{body}$")).map_err(|e| {
            AppError::configuration(format!("Invalid origin pattern '{entry}': {e}"))
        })?;
        Ok(Self::Wildcard(re))
    }

    fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Exact(entry) => entry == origin,
            Self::Wildcard(re) => re.is_match(origin),
        }
    }
}

/// Decides whether a declared origin is on the allow-list.
///
/// Built once at startup; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct OriginValidator {
    patterns: Vec<OriginPattern>,
}

impl OriginValidator {
    /// Compiles an ordered allow-list. Blank entries are skipped.
    pub fn new<I, S>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = entries
            .into_iter()
            .filter(|e| !e.as_ref().trim().is_empty())
            .map(|e| OriginPattern::compile(e.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Exact match, or a wildcard entry matching the whole origin.
    /// An empty origin never matches.
    pub fn is_allowed(&self, origin: &str) -> bool {
        !origin.is_empty() && self.patterns.iter().any(|p| p.matches(origin))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One-shot check against an uncompiled allow-list.
///
/// A pattern that fails to compile never matches.
pub fn is_allowed(origin: &str, allow_list: &[String]) -> bool {
    !origin.is_empty()
        && allow_list
            .iter()
            .filter_map(|entry| OriginPattern::compile(entry).ok())
            .any(|p| p.matches(origin))
}

/// The origin allow-list plus the fixed header values sent on allow.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    validator: OriginValidator,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: HeaderValue,
    max_age: HeaderValue,
    allow_credentials: bool,
}

impl CorsPolicy {
    /// Builds the policy for the configured CORS mode.
    pub fn from_config(config: &CorsConfig) -> AppResult<Self> {
        let validator = OriginValidator::new(config.resolved_origins())?;
        Ok(Self {
            validator,
            allow_methods: joined_header(&config.allowed_methods, "allowed_methods")?,
            allow_headers: joined_header(&config.allowed_headers, "allowed_headers")?,
            expose_headers: joined_header(&config.expose_headers, "expose_headers")?,
            max_age: HeaderValue::from(config.max_age_seconds()),
            allow_credentials: config.allow_credentials,
        })
    }

    pub fn validator(&self) -> &OriginValidator {
        &self.validator
    }

    /// Writes the permission headers for an allowed origin.
    pub fn apply(&self, origin: &HeaderValue, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, self.expose_headers.clone());
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }
}

fn joined_header(values: &[String], key: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&values.join(", "))
        .map_err(|e| AppError::configuration(format!("Invalid cors.{key}: {e}")))
}

/// Origin check stage.
///
/// Preflight `OPTIONS` requests are answered here with 204 and never
/// reach later stages. Any request carrying `Origin` gets `Vary: Origin`,
/// whether or not the origin is allowed.
pub async fn validate_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let has_origin = request.headers().contains_key(ORIGIN);
    let allowed_origin = request
        .headers()
        .get(ORIGIN)
        .filter(|value| {
            value
                .to_str()
                .map(|origin| state.cors.validator().is_allowed(origin))
                .unwrap_or(false)
        })
        .cloned();

    if allowed_origin.is_none() {
        if let Some(origin) = request.headers().get(ORIGIN) {
            tracing::debug!(origin = ?origin, "Origin not on allow-list");
        }
    }

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let Some(origin) = allowed_origin {
        state.cors.apply(&origin, response.headers_mut());
    }
    if has_origin {
        response
            .headers_mut()
            .append(VARY, HeaderValue::from_static("Origin"));
    }

    response
}
