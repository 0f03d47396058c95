use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure loaded from career_compass.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub chat: ChatConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Document store location
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".to_string(),
            namespace: "career_compass".to_string(),
            database: "catalog".to_string(),
        }
    }
}

/// HTTP API listener and listing defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub default_limit: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_limit: 10,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resilient API client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub base_delay_ms: u64,
    pub slow_after_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            // Generous enough to cover a cold start that just hangs
            timeout_ms: 30_000,
            retries: 3,
            base_delay_ms: 1_000,
            slow_after_ms: 3_000,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Chat web-search responder settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    pub search_url: String,
    pub user_agent: String,
    pub max_results: usize,
    pub timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            search_url: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            max_results: 3,
            timeout_ms: 10_000,
        }
    }
}

/// Which [`crate::store::CatalogStore`] backend the server runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Surreal,
    Memory,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub store_backend: StoreBackend,
    pub database_user: String,
    pub database_pass: String,
    pub log_level: String,
    pub seed_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Surreal,
            database_user: "root".to_string(),
            database_pass: "root".to_string(),
            log_level: "career_compass=info,tower_http=info".to_string(),
            seed_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses CAREER_COMPASS_CONFIG environment variable or defaults to "career_compass.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("CAREER_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("CAREER_COMPASS_CONFIG")
            .unwrap_or_else(|_| "career_compass.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Environment wins over the TOML file
    fn apply_env_overrides(&mut self) {
        if let Ok(db_url) = std::env::var("CAREER_DB_URL") {
            self.database.url = db_url;
            tracing::debug!("CAREER_DB_URL env override applied");
        }
        if let Ok(db_ns) = std::env::var("CAREER_DB_NS") {
            self.database.namespace = db_ns;
        }
        if let Ok(db_name) = std::env::var("CAREER_DB_DB") {
            self.database.database = db_name;
        }
        if let Ok(host) = std::env::var("CAREER_HTTP_HOST") {
            self.server.host = host;
        }
        // An unparsable PORT keeps the configured fallback
        if let Some(port) = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(api_url) = std::env::var("CAREER_API_URL") {
            self.client.base_url = api_url;
        }
        if let Some(retries) = std::env::var("CAREER_CLIENT_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.client.retries = retries;
        }
        if let Some(timeout) = std::env::var("CAREER_CLIENT_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.client.timeout_ms = timeout;
        }
    }

    fn validate(&mut self) -> anyhow::Result<()> {
        if self.server.default_limit == 0 {
            anyhow::bail!("server.default_limit must be at least 1");
        }
        if self.client.retries > 10 {
            tracing::warn!(
                "client.retries {} exceeds max 10, clamping to 10",
                self.client.retries
            );
            self.client.retries = 10;
        }
        if self.runtime.store_backend == StoreBackend::Surreal && self.database.url.is_empty() {
            anyhow::bail!("CAREER_DB_URL must not be empty when CAREER_STORE=surreal");
        }
        Ok(())
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let store_backend = match std::env::var("CAREER_STORE").ok().as_deref() {
            Some(v) if v.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Some(v) if !v.eq_ignore_ascii_case("surreal") => {
                tracing::warn!("Unknown CAREER_STORE '{}', using surreal", v);
                StoreBackend::Surreal
            }
            _ => StoreBackend::Surreal,
        };

        Self {
            store_backend,
            database_user: std::env::var("CAREER_DB_USER").unwrap_or_else(|_| "root".to_string()),
            database_pass: std::env::var("CAREER_DB_PASS").unwrap_or_else(|_| "root".to_string()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "career_compass=info,tower_http=info".to_string()),
            seed_dir: std::env::var("CAREER_SEED_DIR").ok().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [client]
            retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.default_limit, 10);
        assert_eq!(config.client.retries, 5);
        assert_eq!(config.client.timeout_ms, 30_000);
        assert_eq!(config.database.namespace, "career_compass");
    }

    #[test]
    fn test_validate_clamps_retries() {
        let mut config = Config::default();
        config.client.retries = 50;
        config.validate().unwrap();
        assert_eq!(config.client.retries, 10);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = Config::default();
        config.server.default_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.bind_addr(), "0.0.0.0:5000");
    }
}
