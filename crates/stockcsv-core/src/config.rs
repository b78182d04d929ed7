use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns [`ConfigError`] if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns [`ConfigError`] if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// tests can drive it with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let bind_addr = parse_addr("STOCKCSV_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("STOCKCSV_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("STOCKCSV_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "STOCKCSV_USER_AGENT",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    );
    let per_page = parse_u32("STOCKCSV_PER_PAGE", "250")?;
    let inter_request_delay_ms = parse_u64("STOCKCSV_INTER_REQUEST_DELAY_MS", "250")?;
    let max_retries = parse_u32("STOCKCSV_MAX_RETRIES", "1")?;
    let retry_backoff_base_secs = parse_u64("STOCKCSV_RETRY_BACKOFF_BASE_SECS", "2")?;
    let render_timeout_secs = parse_u64("STOCKCSV_RENDER_TIMEOUT_SECS", "90")?;
    let headless_enabled = parse_bool("STOCKCSV_HEADLESS_ENABLED", "true")?;
    let account_override = lookup("STOCKCSV_ACCOUNT_OVERRIDE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Ok(AppConfig {
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        per_page,
        inter_request_delay_ms,
        max_retries,
        retry_backoff_base_secs,
        render_timeout_secs,
        headless_enabled,
        account_override,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
