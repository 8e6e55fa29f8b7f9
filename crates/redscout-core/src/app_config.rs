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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub redirect_uri: String,
    pub app_password: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub discovery_cache_ttl_secs: u64,
    pub presets_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("reddit_client_id", &self.reddit_client_id)
            .field("reddit_client_secret", &"[redacted]")
            .field("redirect_uri", &self.redirect_uri)
            .field("app_password", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("discovery_cache_ttl_secs", &self.discovery_cache_ttl_secs)
            .field("presets_path", &self.presets_path)
            .finish()
    }
}
