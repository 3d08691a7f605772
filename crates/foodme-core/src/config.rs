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
/// Parsing and validation live here, decoupled from the process environment so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

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

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("FOODME_ENV", "development"))?;

    let bind_addr = parse_addr("FOODME_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("FOODME_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("FOODME_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FOODME_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "FOODME_DB_MIN_CONNECTIONS",
            format!("must not exceed FOODME_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("FOODME_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let listings_base_url = or_default("FOODME_LISTINGS_BASE_URL", "https://api.yelp.com/v3/");
    let listings_api_key = lookup("FOODME_LISTINGS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    if listings_api_key.is_none() && !env.is_development() {
        return Err(ConfigError::MissingEnvVar(
            "FOODME_LISTINGS_API_KEY".to_string(),
        ));
    }
    let listings_user_agent = or_default(
        "FOODME_LISTINGS_USER_AGENT",
        "foodme/0.1 (restaurant-search)",
    );
    let provider_timeout_secs = parse_u64("FOODME_PROVIDER_TIMEOUT_SECS", "10")?;
    if provider_timeout_secs == 0 {
        return Err(invalid(
            "FOODME_PROVIDER_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let rate_limit_per_minute = parse_usize("FOODME_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        listings_base_url,
        listings_api_key,
        listings_user_agent,
        provider_timeout_secs,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FOODME_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
