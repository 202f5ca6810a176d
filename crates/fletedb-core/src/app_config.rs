use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub google_maps_api_key: Option<String>,
    pub default_owner_id: Uuid,
    pub inter_record_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub geocode_country: String,
    pub geocode_language: String,
    pub catalogs_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &"[redacted]")
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("default_owner_id", &self.default_owner_id)
            .field("inter_record_delay_ms", &self.inter_record_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("geocode_country", &self.geocode_country)
            .field("geocode_language", &self.geocode_language)
            .field("catalogs_path", &self.catalogs_path)
            .finish()
    }
}
