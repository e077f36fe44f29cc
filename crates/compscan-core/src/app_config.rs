use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

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
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub log_level: String,
    pub places_api_key: String,
    pub places_timeout_secs: u64,
    pub places_keyword: String,
    pub chrome_executable: Option<PathBuf>,
    pub nav_timeout_secs: u64,
    pub host_min_interval_ms: u64,
    pub scrape_max_retries: u32,
    pub scrape_backoff_ms: u64,
    pub scan_concurrency: usize,
    pub max_candidates: usize,
}

impl AppConfig {
    #[must_use]
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }

    #[must_use]
    pub fn host_min_interval(&self) -> Duration {
        Duration::from_millis(self.host_min_interval_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .field("places_api_key", &"[redacted]")
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("places_keyword", &self.places_keyword)
            .field("chrome_executable", &self.chrome_executable)
            .field("nav_timeout_secs", &self.nav_timeout_secs)
            .field("host_min_interval_ms", &self.host_min_interval_ms)
            .field("scrape_max_retries", &self.scrape_max_retries)
            .field("scrape_backoff_ms", &self.scrape_backoff_ms)
            .field("scan_concurrency", &self.scan_concurrency)
            .field("max_candidates", &self.max_candidates)
            .finish()
    }
}
