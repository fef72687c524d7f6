use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub casinos: Vec<CasinoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Only verification happens here; tokens are issued by the operator platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Outbound casino transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub timeout_secs: u64,
    /// Retries after the first attempt for transport-level failures.
    pub max_retries: u32,
    /// Base backoff, doubled on every retry.
    pub retry_backoff_ms: u64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 200,
        }
    }
}

/// Background re-delivery of grants left in `resolved`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    pub interval_secs: u64,
    pub stale_after_secs: i64,
    /// Grant rounds (in-request + sweeper) before a mini game is marked failed.
    pub max_attempts: i32,
    pub batch_size: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            stale_after_secs: 120,
            max_attempts: 3,
            batch_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasinoConfig {
    pub id: i64,
    pub endpoint: String,
    /// HMAC key shared with the casino for request signing.
    pub secret: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // No config file: everything comes from the environment
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;
                let jwt_secret = get_env("JWT_SECRET")
                    .ok_or("JWT_SECRET is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig { secret: jwt_secret },
                    integration: IntegrationConfig::default(),
                    sweeper: SweeperConfig::default(),
                    casinos: Vec::new(),
                }
            }
            Err(e) => {
                return Err(format!("Cannot read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// The JWT key has no default and must be non-blank.
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.jwt.secret.trim().is_empty() {
            return Err("JWT secret must not be empty".into());
        }
        Ok(())
    }

    /// Environment variables win over file values.
    fn apply_env_overrides(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = get_env_opt("SERVER_PORT") {
            self.server.port = p;
        }
        if let Some(v) = get_env("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(mc) = get_env_opt("DB_MAX_CONNECTIONS") {
            self.database.max_connections = mc;
        }
        if let Some(v) = get_env("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(n) = get_env_opt("CASINO_TIMEOUT_SECS") {
            self.integration.timeout_secs = n;
        }
        if let Some(n) = get_env_opt("CASINO_MAX_RETRIES") {
            self.integration.max_retries = n;
        }
        if let Some(n) = get_env_opt("CASINO_RETRY_BACKOFF_MS") {
            self.integration.retry_backoff_ms = n;
        }
        if let Some(n) = get_env_opt("SWEEPER_INTERVAL_SECS") {
            self.sweeper.interval_secs = n;
        }
        if let Some(n) = get_env_opt("SWEEPER_STALE_AFTER_SECS") {
            self.sweeper.stale_after_secs = n;
        }
        if let Some(n) = get_env_opt("SWEEPER_MAX_ATTEMPTS") {
            self.sweeper.max_attempts = n;
        }
        if let Some(v) = get_env("CASINOS_JSON") {
            self.casinos = serde_json::from_str(&v)
                .map_err(|e| format!("CASINOS_JSON is not a valid casino list: {e}"))?;
        }
        Ok(())
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_opt<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_env_opt(name).unwrap_or(default)
}
