//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose roster and booking use-cases to Dart via FRB.
//! - Flatten core types into plain envelopes (epoch-ms timestamps, i64 ids).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every envelope carries `ok` plus a human-readable `message`.
//! - A scheduling conflict is reported with `ok=false, conflict=true` and
//!   the conflict text as `message`.

use chrono::{DateTime, TimeZone, Utc};
use log::warn;
use slotbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    with_schedule_service, Appointment, AppointmentDraft, AppointmentId, BackendConfig,
    DynScheduleService, NewParticipant, Participant, ParticipantId, ScheduleOutcome,
    ServiceResult, UPCOMING_DEFAULT_LIMIT,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const UPCOMING_LIMIT_MAX: u32 = 50;
static BACKEND_CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins this process to a local SQLite file instead of the environment.
///
/// # FFI contract
/// - Must run before the first data call to take effect.
/// - Returns empty string on success; repeating the same path is accepted.
/// - Returns an error message when another backend is already active.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_local_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }

    let requested = BackendConfig::Local {
        db_path: PathBuf::from(trimmed),
    };
    let active = BACKEND_CONFIG.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!("backend already configured ({})", active.mode())
    }
}

/// Participant row for UI lists and pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantItem {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Appointment row with epoch-millisecond UTC bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentItem {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    pub participants: Vec<ParticipantItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantListResponse {
    pub ok: bool,
    pub items: Vec<ParticipantItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentListResponse {
    pub ok: bool,
    pub items: Vec<AppointmentItem>,
    pub message: String,
}

/// Result of a participant create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantActionResponse {
    pub ok: bool,
    /// Stored record on create/update success.
    pub participant: Option<ParticipantItem>,
    pub message: String,
}

/// Result of an appointment create/update/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentActionResponse {
    pub ok: bool,
    /// Stored record on create/update success.
    pub appointment: Option<AppointmentItem>,
    /// Set when the request was rejected for double-booking.
    pub conflict: bool,
    pub message: String,
}

/// Home screen counters plus the next few appointments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub participants: u32,
    pub appointments: u32,
    pub upcoming: Vec<AppointmentItem>,
    pub message: String,
}

impl ParticipantActionResponse {
    fn success(message: impl Into<String>, participant: Option<Participant>) -> Self {
        Self {
            ok: true,
            participant: participant.map(ParticipantItem::from),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            participant: None,
            message: message.into(),
        }
    }
}

impl AppointmentActionResponse {
    fn success(message: impl Into<String>, appointment: Option<Appointment>) -> Self {
        Self {
            ok: true,
            appointment: appointment.map(AppointmentItem::from),
            conflict: false,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            appointment: None,
            conflict: false,
            message: message.into(),
        }
    }

    fn from_outcome(outcome: ScheduleOutcome, success_message: &str) -> Self {
        match outcome {
            ScheduleOutcome::Scheduled(appointment) => {
                Self::success(success_message, Some(appointment))
            }
            ScheduleOutcome::Conflict(conflict) => Self {
                ok: false,
                appointment: None,
                conflict: true,
                message: conflict.to_string(),
            },
        }
    }
}

impl From<Participant> for ParticipantItem {
    fn from(value: Participant) -> Self {
        Self {
            id: value.id.0,
            name: value.name,
            email: value.email,
        }
    }
}

impl From<Appointment> for AppointmentItem {
    fn from(value: Appointment) -> Self {
        Self {
            id: value.id.0,
            title: value.title,
            description: value.description,
            start_epoch_ms: value.start_time.timestamp_millis(),
            end_epoch_ms: value.end_time.timestamp_millis(),
            participants: value
                .participants
                .into_iter()
                .map(ParticipantItem::from)
                .collect(),
        }
    }
}

/// Lists the participant roster.
///
/// # FFI contract
/// - Sync call, backend-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_participants() -> ParticipantListResponse {
    match with_service(|service| service.list_participants()) {
        Ok(participants) => ParticipantListResponse {
            message: format!("Found {} participant(s).", participants.len()),
            items: participants.into_iter().map(ParticipantItem::from).collect(),
            ok: true,
        },
        Err(err) => ParticipantListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("list_participants failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn create_participant(name: String, email: String) -> ParticipantActionResponse {
    match with_service(|service| service.create_participant(NewParticipant::new(name, email))) {
        Ok(participant) => {
            ParticipantActionResponse::success("Participant created.", Some(participant))
        }
        Err(err) => ParticipantActionResponse::failure(format!("create_participant failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn update_participant(id: i64, name: String, email: String) -> ParticipantActionResponse {
    match with_service(|service| {
        service.update_participant(ParticipantId(id), NewParticipant::new(name, email))
    }) {
        Ok(participant) => {
            ParticipantActionResponse::success("Participant updated.", Some(participant))
        }
        Err(err) => ParticipantActionResponse::failure(format!("update_participant failed: {err}")),
    }
}

/// Deletes a participant and detaches it from its appointments.
///
/// Unknown ids succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_participant(id: i64) -> ParticipantActionResponse {
    match with_service(|service| service.delete_participant(ParticipantId(id))) {
        Ok(()) => ParticipantActionResponse::success("Participant deleted.", None),
        Err(err) => ParticipantActionResponse::failure(format!("delete_participant failed: {err}")),
    }
}

/// Lists appointments in chronological order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_appointments() -> AppointmentListResponse {
    match with_service(|service| service.list_appointments()) {
        Ok(appointments) => appointment_list(appointments),
        Err(err) => AppointmentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("list_appointments failed: {err}"),
        },
    }
}

/// Books a new appointment when no selected participant is double-booked.
///
/// # FFI contract
/// - Timestamps are UTC epoch milliseconds.
/// - Unknown participant ids are ignored.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn create_appointment(
    title: Option<String>,
    description: Option<String>,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
    participant_ids: Vec<i64>,
) -> AppointmentActionResponse {
    let draft = match build_draft(
        title,
        description,
        start_epoch_ms,
        end_epoch_ms,
        participant_ids,
    ) {
        Ok(draft) => draft,
        Err(err) => {
            return AppointmentActionResponse::failure(format!("create_appointment failed: {err}"))
        }
    };

    match with_service(|service| service.create_appointment(&draft)) {
        Ok(outcome) => AppointmentActionResponse::from_outcome(outcome, "Appointment created."),
        Err(err) => AppointmentActionResponse::failure(format!("create_appointment failed: {err}")),
    }
}

/// Reschedules or edits an existing appointment.
#[flutter_rust_bridge::frb(sync)]
pub fn update_appointment(
    id: i64,
    title: Option<String>,
    description: Option<String>,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
    participant_ids: Vec<i64>,
) -> AppointmentActionResponse {
    let draft = match build_draft(
        title,
        description,
        start_epoch_ms,
        end_epoch_ms,
        participant_ids,
    ) {
        Ok(draft) => draft,
        Err(err) => {
            return AppointmentActionResponse::failure(format!("update_appointment failed: {err}"))
        }
    };

    match with_service(|service| service.update_appointment(AppointmentId(id), &draft)) {
        Ok(outcome) => AppointmentActionResponse::from_outcome(outcome, "Appointment updated."),
        Err(err) => AppointmentActionResponse::failure(format!("update_appointment failed: {err}")),
    }
}

/// Unknown ids succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_appointment(id: i64) -> AppointmentActionResponse {
    match with_service(|service| service.delete_appointment(AppointmentId(id))) {
        Ok(()) => AppointmentActionResponse::success("Appointment deleted.", None),
        Err(err) => AppointmentActionResponse::failure(format!("delete_appointment failed: {err}")),
    }
}

/// Returns appointments starting after now, soonest first.
///
/// `limit` of `None` or `0` falls back to the dashboard default; values above
/// 50 are clamped.
#[flutter_rust_bridge::frb(sync)]
pub fn upcoming_appointments(limit: Option<u32>) -> AppointmentListResponse {
    let limit = normalize_upcoming_limit(limit);
    match with_service(|service| service.upcoming_appointments(Utc::now(), limit)) {
        Ok(appointments) => appointment_list(appointments),
        Err(err) => AppointmentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("upcoming_appointments failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn dashboard() -> DashboardResponse {
    let now = Utc::now();
    let result = with_service(|service| {
        let summary = service.dashboard_summary(now)?;
        let upcoming = service.upcoming_appointments(now, UPCOMING_DEFAULT_LIMIT)?;
        Ok((summary, upcoming))
    });

    match result {
        Ok((summary, upcoming)) => DashboardResponse {
            ok: true,
            participants: saturating_u32(summary.participants),
            appointments: saturating_u32(summary.appointments),
            upcoming: upcoming.into_iter().map(AppointmentItem::from).collect(),
            message: format!("{} upcoming appointment(s).", summary.upcoming),
        },
        Err(err) => DashboardResponse {
            ok: false,
            participants: 0,
            appointments: 0,
            upcoming: Vec::new(),
            message: format!("dashboard failed: {err}"),
        },
    }
}

fn appointment_list(appointments: Vec<Appointment>) -> AppointmentListResponse {
    AppointmentListResponse {
        ok: true,
        message: format!("Found {} appointment(s).", appointments.len()),
        items: appointments.into_iter().map(AppointmentItem::from).collect(),
    }
}

fn build_draft(
    title: Option<String>,
    description: Option<String>,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
    participant_ids: Vec<i64>,
) -> Result<AppointmentDraft, String> {
    let start_time = epoch_ms_to_utc(start_epoch_ms, "start_epoch_ms")?;
    let end_time = epoch_ms_to_utc(end_epoch_ms, "end_epoch_ms")?;
    let participant_ids = participant_ids.into_iter().map(ParticipantId).collect();

    let draft = AppointmentDraft::new(title, start_time, end_time, participant_ids);
    Ok(match description {
        Some(description) => draft.with_description(description),
        None => draft,
    })
}

fn epoch_ms_to_utc(value: i64, field: &str) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| format!("{field} is out of range: {value}"))
}

fn normalize_upcoming_limit(limit: Option<u32>) -> usize {
    let limit = match limit {
        None | Some(0) => return UPCOMING_DEFAULT_LIMIT,
        Some(value) => value.min(UPCOMING_LIMIT_MAX),
    };
    usize::try_from(limit).unwrap_or(UPCOMING_DEFAULT_LIMIT)
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn resolve_backend_config() -> Result<BackendConfig, String> {
    if let Some(config) = BACKEND_CONFIG.get() {
        return Ok(config.clone());
    }

    let config = BackendConfig::from_env().map_err(|err| {
        warn!("event=backend_config module=ffi status=error error={err}");
        err.to_string()
    })?;
    Ok(BACKEND_CONFIG.get_or_init(|| config).clone())
}

fn with_service<T>(
    f: impl for<'a> FnOnce(&DynScheduleService<'a>) -> ServiceResult<T>,
) -> Result<T, String> {
    let config = resolve_backend_config()?;
    with_schedule_service(&config, f).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        configure_local_store, core_version, create_appointment, create_participant, dashboard,
        delete_participant, init_logging, list_appointments, list_participants,
        normalize_upcoming_limit, ping, update_appointment, upcoming_appointments,
    };
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    const HOUR_MS: i64 = 60 * 60 * 1000;
    // 2100-01-01T00:00:00Z, always in the future for upcoming checks.
    const FAR_FUTURE_MS: i64 = 4_102_444_800_000;

    static TEST_STORE: OnceLock<()> = OnceLock::new();

    fn use_test_store() {
        TEST_STORE.get_or_init(|| {
            let dir = std::env::temp_dir().join(unique_token("slotbook-ffi"));
            std::fs::create_dir_all(&dir).expect("create test dir");
            let db_path = dir.join("slotbook.sqlite3");
            let error = configure_local_store(db_path.to_string_lossy().into_owned());
            assert!(error.is_empty(), "{error}");
        });
    }

    fn new_participant_id(label: &str) -> i64 {
        let token = unique_token(label);
        let response = create_participant(token.clone(), format!("{token}@example.com"));
        assert!(response.ok, "{}", response.message);
        response.participant.expect("created participant").id
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_local_store_rejects_blank_path() {
        assert!(!configure_local_store("  ".to_string()).is_empty());
    }

    #[test]
    fn upcoming_limit_is_defaulted_and_clamped() {
        assert_eq!(normalize_upcoming_limit(None), 3);
        assert_eq!(normalize_upcoming_limit(Some(0)), 3);
        assert_eq!(normalize_upcoming_limit(Some(7)), 7);
        assert_eq!(normalize_upcoming_limit(Some(500)), 50);
    }

    #[test]
    fn created_participant_is_listed_and_invalid_email_rejected() {
        use_test_store();
        let id = new_participant_id("roster");

        let listed = list_participants();
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.iter().filter(|item| item.id == id).count(), 1);

        let invalid = create_participant("Nobody".to_string(), "nobody".to_string());
        assert!(!invalid.ok);
        assert!(invalid.message.contains("invalid email"));
    }

    #[test]
    fn overlapping_booking_reports_conflict() {
        use_test_store();
        let id = new_participant_id("conflict");
        let start = FAR_FUTURE_MS;

        let first = create_appointment(
            Some("planning".to_string()),
            None,
            start,
            start + HOUR_MS,
            vec![id],
        );
        assert!(first.ok, "{}", first.message);
        let booked = first.appointment.expect("created appointment");
        assert_eq!(booked.start_epoch_ms, start);
        assert_eq!(booked.participants[0].id, id);

        let clash = create_appointment(
            Some("clash".to_string()),
            None,
            start + HOUR_MS / 2,
            start + 2 * HOUR_MS,
            vec![id],
        );
        assert!(!clash.ok);
        assert!(clash.conflict);
        assert!(clash.message.starts_with("Scheduling conflict"));

        let moved = update_appointment(
            booked.id,
            Some("planning".to_string()),
            Some("moved later".to_string()),
            start + HOUR_MS / 2,
            start + 2 * HOUR_MS,
            vec![id],
        );
        assert!(moved.ok, "{}", moved.message);
        let moved = moved.appointment.expect("updated appointment");
        assert_eq!(moved.description.as_deref(), Some("moved later"));

        let listed = list_appointments();
        assert!(listed.items.iter().any(|item| item.id == booked.id));

        let upcoming = upcoming_appointments(Some(50));
        assert!(upcoming.ok, "{}", upcoming.message);
        assert!(upcoming.items.iter().any(|item| item.id == booked.id));
    }

    #[test]
    fn reversed_range_is_rejected() {
        use_test_store();
        let id = new_participant_id("reversed");
        let response = create_appointment(None, None, FAR_FUTURE_MS, FAR_FUTURE_MS - 1, vec![id]);
        assert!(!response.ok);
        assert!(!response.conflict);
        assert!(response.message.contains("end_time"));
    }

    #[test]
    fn deleting_participant_detaches_it_from_appointments() {
        use_test_store();
        let id = new_participant_id("cascade");
        let start = FAR_FUTURE_MS + 100 * HOUR_MS;
        let created = create_appointment(None, None, start, start + HOUR_MS, vec![id]);
        assert!(created.ok, "{}", created.message);
        let appointment_id = created.appointment.expect("created appointment").id;

        let deleted = delete_participant(id);
        assert!(deleted.ok, "{}", deleted.message);

        let listed = list_appointments();
        let detached = listed
            .items
            .iter()
            .find(|item| item.id == appointment_id)
            .expect("appointment survives participant deletion");
        assert!(detached.participants.iter().all(|item| item.id != id));

        let summary = dashboard();
        assert!(summary.ok, "{}", summary.message);
        assert!(summary.appointments >= 1);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
