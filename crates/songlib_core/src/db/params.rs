//! Opaque connection parameters handed to the storage gateway at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lock wait applied when no explicit timeout is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_DATABASE_NAME: &str = ":memory:";

/// Where the catalog database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

/// Connection parameters resolved by the configuration loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub location: DatabaseLocation,
    /// Maximum wait on a locked database before a statement fails.
    pub busy_timeout: Duration,
}

impl ConnectionParams {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: DatabaseLocation::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Resolves a configured database name; `:memory:` selects an in-memory store.
    pub fn from_database_name(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed == MEMORY_DATABASE_NAME {
            Self::in_memory()
        } else {
            Self::file(trimmed)
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self.location {
            DatabaseLocation::File(_) => "file",
            DatabaseLocation::Memory => "memory",
        }
    }
}
