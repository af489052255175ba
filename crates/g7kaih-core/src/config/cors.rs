//! CORS (Cross-Origin Resource Sharing) and backend IP allow-list configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selects which configured origin list is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsMode {
    /// Local frontend and admin dev servers.
    Development,
    /// Staging frontend and admin hosts.
    Staging,
    /// Production frontend and admin hosts.
    Production,
    /// Only `custom_origins`.
    Custom,
    /// Every environment plus `custom_origins` (for testing).
    All,
}

impl CorsMode {
    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Custom => "custom",
            Self::All => "all",
        }
    }
}

impl fmt::Display for CorsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            "custom" => Ok(Self::Custom),
            "all" => Ok(Self::All),
            other => Err(format!("unknown CORS mode '{other}'")),
        }
    }
}

/// Cross-origin settings and the backend IP allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// One of `development`, `staging`, `production`, `custom`, `all`.
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Development frontend origin.
    #[serde(default = "default_dev_frontend")]
    pub dev_frontend_url: String,
    /// Development admin origin.
    #[serde(default = "default_dev_admin")]
    pub dev_admin_url: String,
    /// Staging frontend origin.
    #[serde(default = "default_staging_frontend")]
    pub staging_frontend_url: String,
    /// Staging admin origin.
    #[serde(default = "default_staging_admin")]
    pub staging_admin_url: String,
    /// Production frontend origin.
    #[serde(default = "default_prod_frontend")]
    pub prod_frontend_url: String,
    /// Production admin origin.
    #[serde(default = "default_prod_admin")]
    pub prod_admin_url: String,
    /// Extra origins; may contain `*` wildcards.
    #[serde(default)]
    pub custom_origins: Vec<String>,
    /// Frontend hosts by IP; each adds an `http://` and an `https://` origin.
    #[serde(default)]
    pub allowed_frontend_ips: Vec<String>,
    /// Client addresses allowed to reach the backend at all. Empty disables the check.
    #[serde(default)]
    pub allowed_backend_ips: Vec<String>,
    /// Whether `Access-Control-Allow-Credentials: true` is sent.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    /// Preflight cache lifetime in hours.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    /// Methods advertised in `Access-Control-Allow-Methods`.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    /// Headers advertised in `Access-Control-Allow-Headers`.
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
    /// Headers advertised in `Access-Control-Expose-Headers`.
    #[serde(default = "default_expose_headers")]
    pub expose_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            dev_frontend_url: default_dev_frontend(),
            dev_admin_url: default_dev_admin(),
            staging_frontend_url: default_staging_frontend(),
            staging_admin_url: default_staging_admin(),
            prod_frontend_url: default_prod_frontend(),
            prod_admin_url: default_prod_admin(),
            custom_origins: Vec::new(),
            allowed_frontend_ips: Vec::new(),
            allowed_backend_ips: Vec::new(),
            allow_credentials: default_true(),
            max_age_hours: default_max_age_hours(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            expose_headers: default_expose_headers(),
        }
    }
}

impl CorsConfig {
    /// Parses `mode`, falling back to development for unknown values.
    pub fn mode(&self) -> CorsMode {
        self.mode.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "Falling back to development CORS mode");
            CorsMode::Development
        })
    }

    /// The ordered origin allow-list for the active mode.
    ///
    /// Frontend IPs are appended as `http://ip` and `https://ip`; empty
    /// entries are dropped.
    pub fn resolved_origins(&self) -> Vec<String> {
        let mut origins = match self.mode() {
            CorsMode::Development => {
                vec![self.dev_frontend_url.clone(), self.dev_admin_url.clone()]
            }
            CorsMode::Staging => vec![
                self.staging_frontend_url.clone(),
                self.staging_admin_url.clone(),
            ],
            CorsMode::Production => {
                vec![self.prod_frontend_url.clone(), self.prod_admin_url.clone()]
            }
            CorsMode::Custom => self.custom_origins.clone(),
            CorsMode::All => {
                let mut all = vec![
                    self.dev_frontend_url.clone(),
                    self.dev_admin_url.clone(),
                    self.staging_frontend_url.clone(),
                    self.staging_admin_url.clone(),
                    self.prod_frontend_url.clone(),
                    self.prod_admin_url.clone(),
                ];
                all.extend(self.custom_origins.iter().cloned());
                all
            }
        };

        for ip in self.allowed_frontend_ips.iter().filter(|ip| !ip.is_empty()) {
            origins.push(format!("http://{ip}"));
            origins.push(format!("https://{ip}"));
        }

        origins.retain(|o| !o.trim().is_empty());
        origins
    }

    /// Preflight cache lifetime in seconds.
    pub fn max_age_seconds(&self) -> u64 {
        self.max_age_hours.saturating_mul(3600)
    }
}

fn default_mode() -> String {
    "development".to_string()
}

fn default_dev_frontend() -> String {
    "http://localhost:3000".to_string()
}

fn default_dev_admin() -> String {
    "http://localhost:3001".to_string()
}

fn default_staging_frontend() -> String {
    "http://staging.g7kaih.com".to_string()
}

fn default_staging_admin() -> String {
    "http://admin-staging.g7kaih.com".to_string()
}

fn default_prod_frontend() -> String {
    "https://g7kaih.com".to_string()
}

fn default_prod_admin() -> String {
    "https://admin.g7kaih.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_age_hours() -> u64 {
    12
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allowed_headers() -> Vec<String> {
    [
        "Origin",
        "Content-Type",
        "Accept",
        "Authorization",
        "X-Requested-With",
        "X-CSRF-Token",
        "X-Request-ID",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_expose_headers() -> Vec<String> {
    ["Content-Length", "Content-Type", "Authorization"]
        .into_iter()
        .map(String::from)
        .collect()
}
