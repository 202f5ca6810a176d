use crate::app_config::{AppConfig, Environment};
use crate::listing::DEFAULT_OWNER_ID;
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
/// Unlike [`load_app_config`], this does not load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let present = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        present(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        present(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let supabase_url = require("SUPABASE_URL")?;
    // The service-role key bypasses row-level security; prefer it when set.
    let supabase_key = present("SUPABASE_SERVICE_ROLE_KEY")
        .or_else(|| present("SUPABASE_KEY"))
        .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_KEY".to_string()))?;
    let google_maps_api_key = present("GOOGLE_MAPS_API_KEY");

    let env = parse_environment(&or_default("FLETEDB_ENV", "development"))?;
    let log_level = or_default("FLETEDB_LOG_LEVEL", "info");

    let owner_raw = or_default("FLETEDB_DEFAULT_OWNER_ID", DEFAULT_OWNER_ID);
    let default_owner_id =
        uuid::Uuid::parse_str(&owner_raw).map_err(|e| ConfigError::InvalidEnvVar {
            var: "FLETEDB_DEFAULT_OWNER_ID".to_string(),
            reason: e.to_string(),
        })?;

    let inter_record_delay_ms = parse_u64("FLETEDB_INTER_RECORD_DELAY_MS", "1000")?;
    let request_timeout_secs = parse_u64("FLETEDB_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FLETEDB_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let user_agent = or_default("FLETEDB_USER_AGENT", "fletedb/0.1 (freight-ingest)");
    let geocode_country = or_default("FLETEDB_GEOCODE_COUNTRY", "AR");
    let geocode_language = or_default("FLETEDB_GEOCODE_LANGUAGE", "es");
    let catalogs_path = present("FLETEDB_CATALOGS_PATH").map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        supabase_url,
        supabase_key,
        google_maps_api_key,
        default_owner_id,
        inter_record_delay_ms,
        request_timeout_secs,
        user_agent,
        geocode_country,
        geocode_language,
        catalogs_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FLETEDB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
