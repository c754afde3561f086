use crate::app_config::{AppConfig, Environment, DEFAULT_METADATA_URLS};
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
/// Unlike [`load_app_config`], this does not read `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a map.
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

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("HOLOCRON_ENV", "development"))?;

    let bind_addr = or_default("HOLOCRON_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("HOLOCRON_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("HOLOCRON_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("HOLOCRON_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HOLOCRON_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HOLOCRON_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let metadata_urls = match lookup("HOLOCRON_METADATA_URLS") {
        Ok(raw) => parse_url_list(&raw)?,
        Err(_) => DEFAULT_METADATA_URLS
            .iter()
            .map(|u| (*u).to_string())
            .collect(),
    };
    let metadata_cache_path = PathBuf::from(or_default(
        "HOLOCRON_METADATA_CACHE_PATH",
        "./.cache/cards.json",
    ));
    let metadata_cache_max_age_secs = parse_u64("HOLOCRON_METADATA_CACHE_MAX_AGE_SECS", "604800")?;
    let metadata_request_timeout_secs =
        parse_u64("HOLOCRON_METADATA_REQUEST_TIMEOUT_SECS", "30")?;
    let metadata_user_agent = or_default(
        "HOLOCRON_METADATA_USER_AGENT",
        "holocron/0.1 (collection-catalog)",
    );
    let metadata_max_retries = parse_u32("HOLOCRON_METADATA_MAX_RETRIES", "2")?;
    let metadata_retry_backoff_base_ms =
        parse_u64("HOLOCRON_METADATA_RETRY_BACKOFF_BASE_MS", "500")?;
    let metadata_refresh_schedule =
        or_default("HOLOCRON_METADATA_REFRESH_SCHEDULE", "0 0 0 * * *");

    let import_batch_size = or_default("HOLOCRON_IMPORT_BATCH_SIZE", "100")
        .parse::<usize>()
        .map_err(|e| invalid("HOLOCRON_IMPORT_BATCH_SIZE", e.to_string()))?;
    if import_batch_size == 0 {
        return Err(invalid(
            "HOLOCRON_IMPORT_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        metadata_urls,
        metadata_cache_path,
        metadata_cache_max_age_secs,
        metadata_request_timeout_secs,
        metadata_user_agent,
        metadata_max_retries,
        metadata_retry_backoff_base_ms,
        metadata_refresh_schedule,
        import_batch_size,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HOLOCRON_ENV".to_string(),
            reason: format!("expected development, test or production; got {other:?}"),
        }),
    }
}

/// Split a comma-separated endpoint list, keeping the given order.
fn parse_url_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let urls: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if urls.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "HOLOCRON_METADATA_URLS".to_string(),
            reason: "at least one endpoint is required".to_string(),
        });
    }

    if let Some(bad) = urls
        .iter()
        .find(|u| !(u.starts_with("http://") || u.starts_with("https://")))
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "HOLOCRON_METADATA_URLS".to_string(),
            reason: format!("not an http(s) URL: {bad}"),
        });
    }

    Ok(urls)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
