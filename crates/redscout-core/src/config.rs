use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, which suits
/// testing or callers that manage env setup themselves.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let reddit_client_id = require("REDSCOUT_REDDIT_CLIENT_ID")?;
    let reddit_client_secret = require("REDSCOUT_REDDIT_CLIENT_SECRET")?;
    let app_password = require("REDSCOUT_APP_PASSWORD")?;

    let env = parse_environment(&or_default("REDSCOUT_ENV", "development"));

    let bind_addr = parse_addr("REDSCOUT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REDSCOUT_LOG_LEVEL", "info");
    let redirect_uri = or_default(
        "REDSCOUT_REDIRECT_URI",
        "http://localhost:3000/api/v1/auth/reddit/callback",
    );
    let user_agent = or_default("REDSCOUT_USER_AGENT", "redscout/0.1 (audience-discovery)");
    let request_timeout_secs = parse_u64("REDSCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let discovery_cache_ttl_secs = parse_u64("REDSCOUT_DISCOVERY_CACHE_TTL_SECS", "3600")?;
    let presets_path = PathBuf::from(or_default("REDSCOUT_PRESETS_PATH", "./config/presets.yaml"));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        reddit_client_id,
        reddit_client_secret,
        redirect_uri,
        app_password,
        user_agent,
        request_timeout_secs,
        discovery_cache_ttl_secs,
        presets_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
