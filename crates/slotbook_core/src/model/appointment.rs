//! Appointment domain model.
//!
//! # Responsibility
//! - Define the canonical multi-participant appointment record.
//! - Define the operator draft used by create/update use-cases.
//!
//! # Invariants
//! - `end_time > start_time` for every persisted appointment.
//! - `participants` holds materialized roster records; the set may become
//!   empty only through the participant delete cascade.
//! - Single-participant backends are the degenerate case of a one-element
//!   `participants` set.

use crate::model::participant::{Participant, ParticipantId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Integer identity of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub i64);

impl Display for AppointmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical appointment record.
///
/// Serialized with camelCase keys (`startTime`, `endTime`) to keep the
/// persisted collection payload readable by other tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Appointment {
    /// Materializes a record from resolved fields and an assigned id.
    pub fn from_fields(id: AppointmentId, fields: AppointmentFields) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            start_time: fields.start_time,
            end_time: fields.end_time,
            participants: fields.participants,
        }
    }

    /// Returns whether a known participant id is part of this appointment.
    ///
    /// `ParticipantId::UNKNOWN` never matches, on either side.
    pub fn has_participant(&self, id: ParticipantId) -> bool {
        !id.is_unknown()
            && self
                .participants
                .iter()
                .any(|participant| participant.id == id)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        if id.is_unknown() {
            return None;
        }
        self.participants
            .iter()
            .find(|participant| participant.id == id)
    }

    /// Drops one participant from the set, returning whether it was present.
    pub fn remove_participant(&mut self, id: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|participant| participant.id != id);
        before != self.participants.len()
    }

    /// Checks time-window invariants of a persisted record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_window(self.start_time, self.end_time)
    }
}

/// Resolved appointment fields handed to repositories for persistence.
///
/// Participant ids have already been resolved against the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

/// Operator input for creating or rescheduling an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participant_ids: Vec<ParticipantId>,
}

impl AppointmentDraft {
    pub fn new(
        title: Option<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        participant_ids: Vec<ParticipantId>,
    ) -> Self {
        Self {
            title,
            description: None,
            start_time,
            end_time,
            participant_ids,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns a copy with trimmed text and de-duplicated participant ids.
    ///
    /// Blank descriptions collapse to `None`; first occurrence order of
    /// participant ids is preserved.
    pub fn normalized(&self) -> Self {
        let mut participant_ids: Vec<ParticipantId> =
            Vec::with_capacity(self.participant_ids.len());
        for id in &self.participant_ids {
            if !participant_ids.contains(id) {
                participant_ids.push(*id);
            }
        }

        Self {
            title: self.title.as_deref().map(|value| value.trim().to_string()),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            start_time: self.start_time,
            end_time: self.end_time,
            participant_ids,
        }
    }

    /// Checks form-level rules.
    ///
    /// A missing title is accepted (single-participant backends carry none),
    /// a blank one is not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = self.title.as_deref() {
            if title.trim().is_empty() {
                return Err(ValidationError::MissingField("title"));
            }
        }
        if self.participant_ids.is_empty() {
            return Err(ValidationError::NoParticipants);
        }
        validate_window(self.start_time, self.end_time)
    }
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}
