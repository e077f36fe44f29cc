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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u16>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let places_api_key = require("GOOGLE_MAPS_API_KEY")?;

    let env = parse_environment(&or_default("COMPSCAN_ENV", "development"))?;

    let host = or_default("COMPSCAN_HOST", "0.0.0.0");
    let port = parse_u16("PORT", "3000")?;
    let bind_addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "COMPSCAN_HOST".to_string(),
            reason: e.to_string(),
        })?;
    let cors_origin = or_default("COMPSCAN_CORS_ORIGIN", "*");
    let log_level = or_default("COMPSCAN_LOG_LEVEL", "info");

    let places_timeout_secs = parse_u64("COMPSCAN_PLACES_TIMEOUT_SECS", "15")?;
    let places_keyword = or_default("COMPSCAN_PLACES_KEYWORD", "self storage");

    let chrome_executable = lookup("CHROME_EXECUTABLE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let nav_timeout_secs = parse_u64("COMPSCAN_NAV_TIMEOUT_SECS", "30")?;
    let host_min_interval_ms = parse_u64("COMPSCAN_HOST_MIN_INTERVAL_MS", "2000")?;
    let scrape_max_retries = parse_u32("COMPSCAN_SCRAPE_MAX_RETRIES", "2")?;
    let scrape_backoff_ms = parse_u64("COMPSCAN_SCRAPE_BACKOFF_MS", "1000")?;

    let scan_concurrency = parse_usize("COMPSCAN_SCAN_CONCURRENCY", "4")?;
    let max_candidates = parse_usize("COMPSCAN_MAX_CANDIDATES", "20")?;

    Ok(AppConfig {
        env,
        bind_addr,
        cors_origin,
        log_level,
        places_api_key,
        places_timeout_secs,
        places_keyword,
        chrome_executable,
        nav_timeout_secs,
        host_min_interval_ms,
        scrape_max_retries,
        scrape_backoff_ms,
        scan_concurrency,
        max_candidates,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COMPSCAN_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
