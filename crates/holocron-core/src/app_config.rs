use std::net::SocketAddr;
use std::path::PathBuf;

/// Card database endpoints in the order they are tried.
pub const DEFAULT_METADATA_URLS: [&str; 5] = [
    "https://api.swu-db.com/cards",
    "https://swu-db.com/api/cards",
    "https://cards.swu.gg/static/cards.json",
    "https://raw.githubusercontent.com/swu-db/swu-db-data/main/cards.json",
    "https://cdn.jsdelivr.net/gh/swu-db/swu-db-data@main/cards.json",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
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
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub metadata_urls: Vec<String>,
    pub metadata_cache_path: PathBuf,
    pub metadata_cache_max_age_secs: u64,
    pub metadata_request_timeout_secs: u64,
    pub metadata_user_agent: String,
    pub metadata_max_retries: u32,
    pub metadata_retry_backoff_base_ms: u64,
    /// Six-field cron expression (seconds first) for the server's cache refresh job.
    pub metadata_refresh_schedule: String,
    pub import_batch_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("metadata_urls", &self.metadata_urls)
            .field("metadata_cache_path", &self.metadata_cache_path)
            .field(
                "metadata_cache_max_age_secs",
                &self.metadata_cache_max_age_secs,
            )
            .field(
                "metadata_request_timeout_secs",
                &self.metadata_request_timeout_secs,
            )
            .field("metadata_user_agent", &self.metadata_user_agent)
            .field("metadata_max_retries", &self.metadata_max_retries)
            .field(
                "metadata_retry_backoff_base_ms",
                &self.metadata_retry_backoff_base_ms,
            )
            .field("metadata_refresh_schedule", &self.metadata_refresh_schedule)
            .field("import_batch_size", &self.import_batch_size)
            .finish()
    }
}
