use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub liveness_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string, read from `DB_CONN` (falls back to `DATABASE_URL`)
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// HMAC signing secret, read from `SIGN`
    #[serde(skip_serializing)]
    pub signing_secret: String,
    pub jwt_audience: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub cors_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub capacity: u32,
    pub refill_per_second: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }
        if let Ok(v) = env::var("SHUTDOWN_GRACE_SECS") {
            self.server.shutdown_grace_secs = v.parse().unwrap_or(self.server.shutdown_grace_secs);
        }
        if let Ok(v) = env::var("LIVENESS_FILE") {
            self.server.liveness_file = PathBuf::from(v);
        }

        // Database overrides
        if let Ok(v) = env::var("DB_CONN").or_else(|_| env::var("DATABASE_URL")) {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SIGN") {
            self.security.signing_secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            self.security.jwt_audience = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("CORS_HEADERS") {
            self.security.cors_headers = split_list(&v);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_CAPACITY") {
            self.rate_limit.capacity = v.parse().unwrap_or(self.rate_limit.capacity);
        }
        if let Ok(v) = env::var("RATE_LIMIT_PER_SECOND") {
            self.rate_limit.refill_per_second = v.parse().unwrap_or(self.rate_limit.refill_per_second);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                request_timeout_secs: 10,
                shutdown_grace_secs: 5,
                liveness_file: PathBuf::from("/tmp/live"),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                signing_secret: String::new(),
                jwt_audience: "todo-api".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                cors_origins: vec!["http://localhost:8080".to_string()],
                cors_headers: default_cors_headers(),
            },
            rate_limit: RateLimitConfig {
                capacity: 5,
                refill_per_second: 5,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_expiry_hours = 24;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.jwt_expiry_hours = 4;
        config
    }
}

fn default_cors_headers() -> Vec<String> {
    ["Origin", "Authorization", "TransactionID"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Where the environment came from at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvSource {
    /// `local.env` was loaded
    Local(PathBuf),
    /// `local.env` was missing, `.env` was loaded instead
    Fallback(PathBuf),
    /// Neither file was found
    Process,
}

impl EnvSource {
    pub fn local_env_missing(&self) -> bool {
        !matches!(self, EnvSource::Local(_))
    }
}

/// Load `local.env` from the working directory, falling back to `.env`.
/// A missing file is not an error.
pub fn load_env_files() -> EnvSource {
    load_env_files_in(Path::new("."))
}

pub fn load_env_files_in(dir: &Path) -> EnvSource {
    let local = dir.join("local.env");
    if local.is_file() && dotenvy::from_path(&local).is_ok() {
        return EnvSource::Local(local);
    }

    let fallback = dir.join(".env");
    if fallback.is_file() && dotenvy::from_path(&fallback).is_ok() {
        return EnvSource::Fallback(fallback);
    }

    EnvSource::Process
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
