//! Per-call service sessions over a configured backend.
//!
//! # Responsibility
//! - Open the configured backend, run one use-case and release it.
//! - Serialize sessions within the process so overlapping callers cannot
//!   interleave read/compute/replace cycles.
//!
//! # Invariants
//! - At most one session runs at a time per process.
//! - Local sessions get a freshly migrated connection (see `open_store`).

use crate::config::BackendConfig;
use crate::remote::HttpBackend;
use crate::repo::collection_repo::CollectionRepository;
use crate::repo::{RepoError, ScheduleRepository};
use crate::service::schedule_service::{ScheduleService, ServiceResult};
use crate::store::{open_store, SqliteCollectionStore};
use once_cell::sync::Lazy;
use std::sync::Mutex;

static SESSION_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Service over whichever backend the configuration selects.
pub type DynScheduleService<'a> = ScheduleService<Box<dyn ScheduleRepository + 'a>>;

/// Runs `f` against a service bound to `config`.
///
/// # Errors
/// - Storage/transport failures while opening the backend surface as
///   `ServiceError::Repo`.
pub fn with_schedule_service<T>(
    config: &BackendConfig,
    f: impl for<'a> FnOnce(&DynScheduleService<'a>) -> ServiceResult<T>,
) -> ServiceResult<T> {
    let _guard = SESSION_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    match config {
        BackendConfig::Local { db_path } => {
            let conn = open_store(db_path).map_err(RepoError::from)?;
            let repo: Box<dyn ScheduleRepository + '_> =
                Box::new(CollectionRepository::new(SqliteCollectionStore::new(&conn)));
            let service = ScheduleService::new(repo);
            f(&service)
        }
        BackendConfig::Remote(remote) => {
            let repo: Box<dyn ScheduleRepository> = Box::new(HttpBackend::new(remote)?);
            let service = ScheduleService::new(repo);
            f(&service)
        }
    }
}
