//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first when
//! present.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use jangbu_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// SQLite file, or `:memory:` for an ephemeral store
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a posting waits for another writer's lock, in seconds
    pub db_busy_timeout_secs: u64,

    /// Append-only file receiving the error log; disabled when unset
    pub error_log: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ServerConfig {
            host: parse_or(&lookup, "JANGBU_HOST", "127.0.0.1")?,
            port: parse_or(&lookup, "JANGBU_PORT", "3000")?,
            database_path: lookup("JANGBU_DATABASE_PATH")
                .unwrap_or_else(|| "jangbu.db".to_string())
                .into(),
            db_max_connections: parse_or(&lookup, "JANGBU_DB_MAX_CONNECTIONS", "5")?,
            db_busy_timeout_secs: parse_or(&lookup, "JANGBU_DB_BUSY_TIMEOUT_SECS", "5")?,
            error_log: lookup("JANGBU_ERROR_LOG")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "JANGBU_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Pool settings for [`jangbu_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let busy_timeout = Duration::from_secs(self.db_busy_timeout_secs);
        if self.database_path.as_os_str() == ":memory:" {
            DbConfig::in_memory().busy_timeout(busy_timeout)
        } else {
            DbConfig::new(&self.database_path)
                .max_connections(self.db_max_connections)
                .busy_timeout(busy_timeout)
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
