//! Scheduling conflict detection.
//!
//! # Responsibility
//! - Decide whether a proposed time window double-books any participant.
//! - Produce one human-readable description for the first clash found.
//!
//! # Invariants
//! - Read-only: operates on a snapshot and never mutates appointments.
//! - Windows are half-open `[start, end)`; touching endpoints do not clash.
//! - `ParticipantId::UNKNOWN` is never compared, on either side.

use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

const CONFLICT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// First double-booking found for a proposed appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Participant that would be double-booked.
    pub participant: Participant,
    /// Existing appointment already holding the slot.
    pub appointment_id: AppointmentId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Conflict {
    /// Operator-facing description, e.g. for a toast body.
    pub fn message(&self) -> String {
        format!(
            "{} already has a meeting scheduled from {} to {}",
            self.participant.name,
            self.start_time.format(CONFLICT_TIME_FORMAT),
            self.end_time.format(CONFLICT_TIME_FORMAT)
        )
    }
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scheduling conflict: {}", self.message())
    }
}

/// Half-open interval overlap test.
///
/// For windows with `end > start` this is equivalent to the three-clause
/// check (start inside, end inside, full containment).
pub fn windows_overlap(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> bool {
    start_a < end_b && end_a > start_b
}

/// Returns the first conflict for `candidates` in `[start, end)`.
///
/// Candidates are checked in the given order and, per candidate, existing
/// appointments in snapshot order. `exclude` skips the appointment being
/// rescheduled. An empty candidate set never conflicts.
pub fn find_conflict(
    candidates: &[ParticipantId],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<AppointmentId>,
    existing: &[Appointment],
) -> Option<Conflict> {
    for candidate in candidates.iter().copied() {
        if candidate.is_unknown() {
            continue;
        }

        let clash = existing.iter().find(|appointment| {
            if exclude == Some(appointment.id) {
                return false;
            }
            appointment.has_participant(candidate)
                && windows_overlap(start, end, appointment.start_time, appointment.end_time)
        });

        if let Some(appointment) = clash {
            let participant = appointment.participant(candidate)?.clone();
            return Some(Conflict {
                participant,
                appointment_id: appointment.id,
                start_time: appointment.start_time,
                end_time: appointment.end_time,
            });
        }
    }

    None
}
