//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Load an optional `.env` file into the process environment.
//! - Resolve connection parameters, bind address and logging options.
//!
//! # Invariants
//! - Blank values are treated as unset and fall back to defaults.
//! - Invalid values fail loudly instead of being replaced by defaults.

use songlib_core::{default_log_level, ConnectionParams};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_DB_NAME: &str = "songs.sqlite3";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub const DB_NAME_KEY: &str = "DB_NAME";
pub const DB_BUSY_TIMEOUT_MS_KEY: &str = "DB_BUSY_TIMEOUT_MS";
pub const SERVER_HOST_KEY: &str = "SERVER_HOST";
pub const SERVER_PORT_KEY: &str = "SERVER_PORT";
pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvFile { path, source } => {
                write!(f, "failed to load env file `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EnvFile { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db: ConnectionParams,
    pub bind: SocketAddr,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let busy_timeout_ms = parse_value(
            DB_BUSY_TIMEOUT_MS_KEY,
            value(DB_BUSY_TIMEOUT_MS_KEY),
            DEFAULT_BUSY_TIMEOUT_MS,
        )?;
        let db_name = value(DB_NAME_KEY).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let db = ConnectionParams::from_database_name(&db_name)
            .with_busy_timeout(Duration::from_millis(busy_timeout_ms));

        let host = parse_value(SERVER_HOST_KEY, value(SERVER_HOST_KEY), DEFAULT_SERVER_HOST)?;
        let port = parse_value(SERVER_PORT_KEY, value(SERVER_PORT_KEY), DEFAULT_SERVER_PORT)?;

        Ok(Self {
            db,
            bind: SocketAddr::new(host, port),
            log_level: value(LOG_LEVEL_KEY).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_KEY),
        })
    }
}

/// Loads `path` into the process environment.
///
/// A missing file is only an error when `required` is set. Variables
/// already present in the environment win over file entries.
pub fn load_env_file(path: &Path, required: bool) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(err) if !required && err.not_found() => Ok(()),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_value<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}
