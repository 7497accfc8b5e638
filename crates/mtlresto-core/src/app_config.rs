use std::net::SocketAddr;
use std::path::PathBuf;

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
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub area_path: PathBuf,
    /// Profile document used when a caller does not name one explicitly.
    pub default_user_id: Option<String>,
    pub yelp_api_key: Option<String>,
    pub overpass_url: String,
    pub nominatim_url: String,
    pub yelp_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("area_path", &self.area_path)
            .field("database_url", &"[redacted]")
            .field("default_user_id", &self.default_user_id)
            .field(
                "yelp_api_key",
                &self.yelp_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("overpass_url", &self.overpass_url)
            .field("nominatim_url", &self.nominatim_url)
            .field("yelp_url", &self.yelp_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
