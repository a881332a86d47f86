//! Core scheduling logic for Slotbook.
//! This crate is the single source of truth for roster and booking invariants.

pub mod config;
pub mod conflict;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;

pub use config::{BackendConfig, ConfigError};
pub use conflict::{find_conflict, windows_overlap, Conflict};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::appointment::{Appointment, AppointmentDraft, AppointmentFields, AppointmentId};
pub use model::participant::{NewParticipant, Participant, ParticipantId, ValidationError};
pub use remote::{HttpBackend, RemoteConfig};
pub use repo::collection_repo::CollectionRepository;
pub use repo::{
    AppointmentRepository, ParticipantRepository, RepoError, RepoResult, ScheduleRepository,
};
pub use service::schedule_service::{
    DashboardSummary, ScheduleOutcome, ScheduleService, ServiceError, ServiceResult,
    UPCOMING_DEFAULT_LIMIT,
};
pub use session::{with_schedule_service, DynScheduleService};
pub use store::{CollectionKey, CollectionStore, MemoryStore, SqliteCollectionStore, StoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
