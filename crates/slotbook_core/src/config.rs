//! Backend selection from process environment.
//!
//! # Responsibility
//! - Resolve which persistence backend a process talks to.
//!
//! # Invariants
//! - `SLOTBOOK_API_URL` (non-blank) selects the remote backend.
//! - Otherwise the local SQLite file at `SLOTBOOK_DB_PATH` is used, falling
//!   back to `<temp_dir>/slotbook.sqlite3`.

use crate::remote::RemoteConfig;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "SLOTBOOK_DB_PATH";
pub const ENV_API_URL: &str = "SLOTBOOK_API_URL";
pub const ENV_API_TIMEOUT_MS: &str = "SLOTBOOK_API_TIMEOUT_MS";
pub const DEFAULT_DB_FILE_NAME: &str = "slotbook.sqlite3";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeout(value) => write!(
                f,
                "{ENV_API_TIMEOUT_MS} must be a positive integer of milliseconds, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Persistence backend a process is wired to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// SQLite database file.
    Local { db_path: PathBuf },
    /// REST backend with single-participant appointments.
    Remote(RemoteConfig),
}

impl BackendConfig {
    /// Reads backend selection from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base_url) = non_blank(ENV_API_URL) {
            let timeout = match non_blank(ENV_API_TIMEOUT_MS) {
                Some(raw) => parse_timeout(&raw)?,
                None => DEFAULT_API_TIMEOUT,
            };
            return Ok(Self::Remote(RemoteConfig::new(base_url, timeout)));
        }

        let db_path = non_blank(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        Ok(Self::Local { db_path })
    }

    /// Short label for diagnostics (`local|remote`).
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Remote(_) => "remote",
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
