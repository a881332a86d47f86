//! Collection storage backends.
//!
//! # Responsibility
//! - Define the uniform `read(key)` / `write(key, value)` persistence seam.
//! - Provide SQLite (file and in-memory) and process-memory backends.
//! - Apply schema migrations before SQLite connections are handed out.
//!
//! # Invariants
//! - A collection payload is always a complete JSON document; writes replace
//!   the whole collection, never patch it.
//! - `write_all` applies every listed collection or none of them.
//! - Migration version is tracked via `PRAGMA user_version`.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod migrations;
mod open;
mod sqlite;

pub use memory::MemoryStore;
pub use open::{open_store, open_store_in_memory};
pub use sqlite::SqliteCollectionStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Keys of the collections owned by the scheduling core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKey {
    Participants,
    Appointments,
}

impl CollectionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Participants => "participants",
            Self::Appointments => "appointments",
        }
    }
}

impl Display for CollectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Json(serde_json::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Store-internal state is unusable (e.g. a poisoned lock).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid collection payload: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Whole-collection persistence seam.
///
/// Implementations are injected into repositories; nothing in core reaches
/// for a global store.
pub trait CollectionStore {
    /// Reads one collection payload, `None` when it was never written.
    fn read(&self, key: CollectionKey) -> StoreResult<Option<Value>>;

    /// Replaces several collections in one atomic step.
    fn write_all(&self, writes: &[(CollectionKey, Value)]) -> StoreResult<()>;

    /// Replaces one collection.
    fn write(&self, key: CollectionKey, value: Value) -> StoreResult<()> {
        self.write_all(&[(key, value)])
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for &S {
    fn read(&self, key: CollectionKey) -> StoreResult<Option<Value>> {
        (**self).read(key)
    }

    fn write_all(&self, writes: &[(CollectionKey, Value)]) -> StoreResult<()> {
        (**self).write_all(writes)
    }
}
