//! Environment-driven settings for the visit service.
//!
//! Values come from the process environment, optionally seeded by a `.env` file.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::visits::DEFAULT_MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub paging: PagingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: var_or("APP_HOST", "127.0.0.1"),
            port: parse_var("APP_PORT", 3000u16).map_err(|_| ConfigError::InvalidPort)?,
        };
        let store = StoreConfig {
            backend: StoreBackend::parse(&var_or("VISIT_STORE", "memory"))?,
            database_path: PathBuf::from(var_or("VISIT_DB_PATH", "visits.db")),
        };
        let max_page_size = parse_var("VISIT_MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE)
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::InvalidMaxPageSize)?;

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            store,
            paging: PagingConfig { max_page_size },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse `key` when set, else fall back to `default`.
fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, T::Err> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse(),
        Err(_) => Ok(default),
    }
}

/// HTTP bind settings. `--host`/`--port` on the CLI override them.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Fallback `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl StoreBackend {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::UnknownStoreBackend(other.to_string())),
        }
    }
}

/// Where visit applications are persisted.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PagingConfig {
    pub max_page_size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("VISIT_STORE must be 'memory' or 'sqlite', got '{0}'")]
    UnknownStoreBackend(String),
    #[error("VISIT_MAX_PAGE_SIZE must be a positive integer")]
    InvalidMaxPageSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("VISIT_STORE");
        env::remove_var("VISIT_DB_PATH");
        env::remove_var("VISIT_MAX_PAGE_SIZE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.database_path, PathBuf::from("visits.db"));
        assert_eq!(config.paging.max_page_size, DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    fn localhost_binds_loopback_and_bad_hosts_fail() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        env::set_var("APP_PORT", "8088");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8088));

        env::set_var("APP_HOST", "campus.example");
        let config = AppConfig::load().expect("config loads");
        assert!(matches!(
            config.server.socket_addr(),
            Err(ConfigError::InvalidHost { .. })
        ));

        env::set_var("APP_PORT", "70000");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }

    #[test]
    fn reads_sqlite_store_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("VISIT_STORE", "SQLite");
        env::set_var("VISIT_DB_PATH", "/tmp/visit-test.db");
        env::set_var("VISIT_MAX_PAGE_SIZE", "50");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(
            config.store.database_path,
            PathBuf::from("/tmp/visit-test.db")
        );
        assert_eq!(config.paging.max_page_size, 50);
        reset_env();
    }

    #[test]
    fn rejects_unknown_backend_and_zero_page_size() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("VISIT_STORE", "mysql");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::UnknownStoreBackend(value)) if value == "mysql"
        ));

        reset_env();
        env::set_var("VISIT_MAX_PAGE_SIZE", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidMaxPageSize)
        ));
        reset_env();
    }
}
