//! G7KAIH Server: request gatekeeper for the school activity tracker API.
//!
//! Main entry point that loads configuration, sets up logging, and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use g7kaih_api::RouteGroups;
use g7kaih_core::config::AppConfig;
use g7kaih_core::AppResult;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    tracing::info!(
        service = %config.server.service_name,
        version = %config.server.service_version,
        "Configuration loaded"
    );

    if let Err(e) = g7kaih_api::run_server(config, RouteGroups::default()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from the config directory and environment
fn load_configuration() -> AppResult<AppConfig> {
    let config_dir = std::env::var("G7KAIH_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("G7KAIH_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
