//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define participant/appointment data access contracts.
//! - Isolate storage details (collection store, remote API) from services.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to
//!   storage and transport errors.
//! - Deleting a participant rewrites both collections in one atomic step.

use crate::model::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::model::participant::{NewParticipant, Participant, ParticipantId, ValidationError};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod collection_repo;
pub mod ids;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for storage, transport and lookup failures.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Store(StoreError),
    /// HTTP request could not be sent or its body could not be read.
    Transport(reqwest::Error),
    /// Remote backend answered with a non-success status.
    Backend { status: u16, message: String },
    ParticipantNotFound(ParticipantId),
    AppointmentNotFound(AppointmentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Transport(err) => write!(f, "backend request failed: {err}"),
            Self::Backend { status, message } => {
                write!(f, "backend returned status {status}: {message}")
            }
            Self::ParticipantNotFound(id) => write!(f, "participant not found: {id}"),
            Self::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::Backend { .. }
            | Self::ParticipantNotFound(_)
            | Self::AppointmentNotFound(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Repository interface for the participant roster.
pub trait ParticipantRepository {
    fn list_participants(&self) -> RepoResult<Vec<Participant>>;
    /// Assigns a fresh id and persists the participant.
    fn create_participant(&self, fields: &NewParticipant) -> RepoResult<Participant>;
    /// Replaces an existing participant in place.
    fn update_participant(&self, participant: &Participant) -> RepoResult<Participant>;
    /// Removes a participant and detaches it from every appointment.
    ///
    /// Deleting an absent id is a no-op.
    fn delete_participant(&self, id: ParticipantId) -> RepoResult<()>;
}

/// Repository interface for appointments.
pub trait AppointmentRepository {
    fn list_appointments(&self) -> RepoResult<Vec<Appointment>>;
    /// Assigns a fresh id and persists the appointment.
    fn create_appointment(&self, fields: &AppointmentFields) -> RepoResult<Appointment>;
    /// Replaces an existing appointment in place.
    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<Appointment>;
    /// Removes an appointment. Deleting an absent id is a no-op.
    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<()>;
}

/// Combined repository contract consumed by the scheduling service.
pub trait ScheduleRepository: ParticipantRepository + AppointmentRepository {}

impl<T: ParticipantRepository + AppointmentRepository> ScheduleRepository for T {}

impl<R: ParticipantRepository + ?Sized> ParticipantRepository for Box<R> {
    fn list_participants(&self) -> RepoResult<Vec<Participant>> {
        (**self).list_participants()
    }

    fn create_participant(&self, fields: &NewParticipant) -> RepoResult<Participant> {
        (**self).create_participant(fields)
    }

    fn update_participant(&self, participant: &Participant) -> RepoResult<Participant> {
        (**self).update_participant(participant)
    }

    fn delete_participant(&self, id: ParticipantId) -> RepoResult<()> {
        (**self).delete_participant(id)
    }
}

impl<R: AppointmentRepository + ?Sized> AppointmentRepository for Box<R> {
    fn list_appointments(&self) -> RepoResult<Vec<Appointment>> {
        (**self).list_appointments()
    }

    fn create_appointment(&self, fields: &AppointmentFields) -> RepoResult<Appointment> {
        (**self).create_appointment(fields)
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<Appointment> {
        (**self).update_appointment(appointment)
    }

    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<()> {
        (**self).delete_appointment(id)
    }
}
