//! Scheduling use-case service.
//!
//! # Responsibility
//! - Provide the participant/appointment entry points used by UI callers.
//! - Validate input, resolve participant ids and run conflict detection
//!   before delegating persistence to repositories.
//!
//! # Invariants
//! - Validation errors never reach the repository.
//! - Mutations are serialized per service instance; the conflict check and
//!   the write it guards run under the same lock.
//! - A detected conflict is a value (`ScheduleOutcome::Conflict`) and
//!   nothing is persisted.
//! - Participant ids that match no roster entry are dropped on
//!   create/update; a draft left with no known participant is rejected.

use crate::conflict::{find_conflict, Conflict};
use crate::model::appointment::{Appointment, AppointmentDraft, AppointmentFields, AppointmentId};
use crate::model::participant::{NewParticipant, Participant, ParticipantId, ValidationError};
use crate::repo::{AppointmentRepository, ParticipantRepository, RepoError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

/// Default number of entries returned by `upcoming_appointments`.
pub const UPCOMING_DEFAULT_LIMIT: usize = 3;

/// Service error for scheduling use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any persistence call.
    Validation(ValidationError),
    ParticipantNotFound(ParticipantId),
    AppointmentNotFound(AppointmentId),
    /// Storage or transport failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation error: {err}"),
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::ParticipantNotFound(id) => Self::ParticipantNotFound(id),
            RepoError::AppointmentNotFound(id) => Self::AppointmentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result of an appointment create/update that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled(Appointment),
    Conflict(Conflict),
}

impl ScheduleOutcome {
    pub fn appointment(&self) -> Option<&Appointment> {
        match self {
            Self::Scheduled(appointment) => Some(appointment),
            Self::Conflict(_) => None,
        }
    }

    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            Self::Scheduled(_) => None,
            Self::Conflict(conflict) => Some(conflict),
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}

/// Counters shown on the operator dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub participants: usize,
    pub appointments: usize,
    /// Appointments starting strictly after the reference instant, capped
    /// at `UPCOMING_DEFAULT_LIMIT` like the dashboard list it labels.
    pub upcoming: usize,
}

/// Scheduling facade over repository implementations.
pub struct ScheduleService<R> {
    repo: R,
    write_lock: Mutex<()>,
}

impl<R> ScheduleService<R>
where
    R: ParticipantRepository + AppointmentRepository,
{
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    pub fn list_participants(&self) -> ServiceResult<Vec<Participant>> {
        Ok(self.repo.list_participants()?)
    }

    pub fn create_participant(&self, fields: NewParticipant) -> ServiceResult<Participant> {
        fields.validate()?;

        let _guard = self.lock_writes();
        let participant = self.repo.create_participant(&fields)?;
        info!(
            "event=participant_create module=service status=ok participant_id={}",
            participant.id
        );
        Ok(participant)
    }

    /// Replaces a participant's name and email.
    pub fn update_participant(
        &self,
        id: ParticipantId,
        fields: NewParticipant,
    ) -> ServiceResult<Participant> {
        fields.validate()?;

        let _guard = self.lock_writes();
        let participant = self.repo.update_participant(&Participant::new(id, fields))?;
        info!(
            "event=participant_update module=service status=ok participant_id={}",
            participant.id
        );
        Ok(participant)
    }

    /// Removes a participant and detaches it from all appointments.
    ///
    /// Deleting an absent id succeeds without changes.
    pub fn delete_participant(&self, id: ParticipantId) -> ServiceResult<()> {
        let _guard = self.lock_writes();
        self.repo.delete_participant(id)?;
        info!(
            "event=participant_delete module=service status=ok participant_id={}",
            id
        );
        Ok(())
    }

    /// Lists appointments ordered by start time, ties broken by id.
    pub fn list_appointments(&self) -> ServiceResult<Vec<Appointment>> {
        let mut appointments = self.repo.list_appointments()?;
        sort_chronologically(&mut appointments);
        Ok(appointments)
    }

    /// Validates, checks for conflicts and persists a new appointment.
    pub fn create_appointment(&self, draft: &AppointmentDraft) -> ServiceResult<ScheduleOutcome> {
        let draft = draft.normalized();
        draft.validate()?;

        let _guard = self.lock_writes();
        let fields = self.resolve_fields(&draft)?;
        let existing = self.repo.list_appointments()?;
        if let Some(conflict) = find_conflict(
            &draft.participant_ids,
            draft.start_time,
            draft.end_time,
            None,
            &existing,
        ) {
            info!(
                "event=appointment_create module=service status=conflict conflicting_id={}",
                conflict.appointment_id
            );
            return Ok(ScheduleOutcome::Conflict(conflict));
        }

        let appointment = self.repo.create_appointment(&fields)?;
        info!(
            "event=appointment_create module=service status=ok appointment_id={} participants={}",
            appointment.id,
            appointment.participants.len()
        );
        Ok(ScheduleOutcome::Scheduled(appointment))
    }

    /// Reschedules or edits an appointment.
    ///
    /// Fails with `AppointmentNotFound` before any conflict check when the
    /// id is absent. The appointment's own current slot never conflicts.
    pub fn update_appointment(
        &self,
        id: AppointmentId,
        draft: &AppointmentDraft,
    ) -> ServiceResult<ScheduleOutcome> {
        let draft = draft.normalized();
        draft.validate()?;

        let _guard = self.lock_writes();
        let existing = self.repo.list_appointments()?;
        if !existing.iter().any(|appointment| appointment.id == id) {
            return Err(ServiceError::AppointmentNotFound(id));
        }
        let fields = self.resolve_fields(&draft)?;

        if let Some(conflict) = find_conflict(
            &draft.participant_ids,
            draft.start_time,
            draft.end_time,
            Some(id),
            &existing,
        ) {
            info!(
                "event=appointment_update module=service status=conflict appointment_id={} conflicting_id={}",
                id, conflict.appointment_id
            );
            return Ok(ScheduleOutcome::Conflict(conflict));
        }

        let appointment = self
            .repo
            .update_appointment(&Appointment::from_fields(id, fields))?;
        info!(
            "event=appointment_update module=service status=ok appointment_id={}",
            appointment.id
        );
        Ok(ScheduleOutcome::Scheduled(appointment))
    }

    /// Removes an appointment. Deleting an absent id succeeds without changes.
    pub fn delete_appointment(&self, id: AppointmentId) -> ServiceResult<()> {
        let _guard = self.lock_writes();
        self.repo.delete_appointment(id)?;
        info!(
            "event=appointment_delete module=service status=ok appointment_id={}",
            id
        );
        Ok(())
    }

    /// Returns up to `limit` appointments starting after `now`, soonest first.
    pub fn upcoming_appointments(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> ServiceResult<Vec<Appointment>> {
        let mut upcoming = self.list_appointments()?;
        upcoming.retain(|appointment| appointment.start_time > now);
        upcoming.truncate(limit);
        Ok(upcoming)
    }

    pub fn dashboard_summary(&self, now: DateTime<Utc>) -> ServiceResult<DashboardSummary> {
        let participants = self.repo.list_participants()?.len();
        let appointments = self.repo.list_appointments()?;
        let upcoming = appointments
            .iter()
            .filter(|appointment| appointment.start_time > now)
            .take(UPCOMING_DEFAULT_LIMIT)
            .count();
        Ok(DashboardSummary {
            participants,
            appointments: appointments.len(),
            upcoming,
        })
    }

    fn resolve_fields(&self, draft: &AppointmentDraft) -> ServiceResult<AppointmentFields> {
        let roster = self.repo.list_participants()?;
        let participants = resolve_participants(&draft.participant_ids, &roster);
        let dropped = draft.participant_ids.len().saturating_sub(participants.len());
        if dropped > 0 {
            warn!(
                "event=participant_resolve module=service status=partial dropped_ids={}",
                dropped
            );
        }
        if participants.is_empty() {
            return Err(ValidationError::NoParticipants.into());
        }

        Ok(AppointmentFields {
            title: draft.title.clone(),
            description: draft.description.clone(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            participants,
        })
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // Lock guards no data; a poisoned lock is still usable.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolves ids against the roster, keeping roster order.
fn resolve_participants(ids: &[ParticipantId], roster: &[Participant]) -> Vec<Participant> {
    roster
        .iter()
        .filter(|participant| !participant.id.is_unknown() && ids.contains(&participant.id))
        .cloned()
        .collect()
}

fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by(|left, right| {
        left.start_time
            .cmp(&right.start_time)
            .then_with(|| left.id.cmp(&right.id))
    });
}
