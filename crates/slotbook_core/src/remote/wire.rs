//! Remote API payload shapes and translation to the canonical model.
//!
//! # Responsibility
//! - Mirror the JSON bodies exchanged with the single-participant backend.
//! - Project canonical appointments down and recover them on the way back.
//!
//! # Invariants
//! - Recovered participants that match no roster entry carry
//!   `ParticipantId::UNKNOWN`; the backend does not return participant ids.
//! - Title and description are not stored by the backend and come back as
//!   `None`.

use crate::model::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::model::participant::{Participant, ParticipantId};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Participant as listed by `/participants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireParticipant {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<WireParticipant> for Participant {
    fn from(value: WireParticipant) -> Self {
        Self {
            id: ParticipantId(value.id),
            name: value.name,
            email: value.email,
        }
    }
}

/// Body for participant create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireParticipantBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// Appointment as returned by `/appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAppointment {
    pub id: i64,
    /// Participant display name.
    pub participant: String,
    #[serde(default)]
    pub email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Body for appointment create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAppointmentBody {
    pub participant_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Projects canonical fields onto the single-participant request body.
///
/// Only the first known participant is sent; extra participants, title and
/// description are dropped.
pub fn project_appointment(fields: &AppointmentFields) -> RepoResult<WireAppointmentBody> {
    let mut known = fields
        .participants
        .iter()
        .filter(|participant| !participant.id.is_unknown());
    let primary = known.next().ok_or_else(|| {
        RepoError::InvalidData("remote backend requires one known participant".to_string())
    })?;

    let dropped = known.count();
    if dropped > 0 {
        warn!(
            "event=appointment_project module=remote status=lossy dropped_participants={}",
            dropped
        );
    }

    Ok(WireAppointmentBody {
        participant_id: primary.id.0,
        start_time: fields.start_time,
        end_time: fields.end_time,
    })
}

/// Rebuilds a canonical appointment from a backend record.
///
/// The participant is matched against `roster` by email (case-insensitive)
/// first, then by exact name. Without a match the participant keeps the
/// backend name and `ParticipantId::UNKNOWN`.
pub fn recover_appointment(wire: WireAppointment, roster: &[Participant]) -> Appointment {
    let participant = recover_participant(&wire.participant, wire.email.as_deref(), roster);
    Appointment {
        id: AppointmentId(wire.id),
        title: None,
        description: None,
        start_time: wire.start_time,
        end_time: wire.end_time,
        participants: vec![participant],
    }
}

fn recover_participant(name: &str, email: Option<&str>, roster: &[Participant]) -> Participant {
    let by_email = email
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| {
            roster
                .iter()
                .find(|participant| participant.email.eq_ignore_ascii_case(value))
        });
    let matched = by_email.or_else(|| roster.iter().find(|participant| participant.name == name));

    match matched {
        Some(participant) => participant.clone(),
        None => Participant {
            id: ParticipantId::UNKNOWN,
            name: name.to_string(),
            email: email.unwrap_or_default().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{project_appointment, recover_appointment, WireAppointment};
    use crate::model::appointment::AppointmentFields;
    use crate::model::participant::{Participant, ParticipantId};
    use crate::repo::RepoError;
    use chrono::{TimeZone, Utc};

    fn roster() -> Vec<Participant> {
        vec![
            Participant {
                id: ParticipantId(1),
                name: "Pat".into(),
                email: "pat@example.com".into(),
            },
            Participant {
                id: ParticipantId(2),
                name: "Sam".into(),
                email: "sam@example.com".into(),
            },
        ]
    }

    fn wire(participant: &str, email: Option<&str>) -> WireAppointment {
        WireAppointment {
            id: 9,
            participant: participant.to_string(),
            email: email.map(str::to_string),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
        }
    }

    #[test]
    fn recovery_prefers_email_then_name() {
        let by_email = recover_appointment(wire("Someone Else", Some("SAM@example.com")), &roster());
        assert_eq!(by_email.participants[0].id, ParticipantId(2));

        let by_name = recover_appointment(wire("Pat", None), &roster());
        assert_eq!(by_name.participants[0].id, ParticipantId(1));
        assert_eq!(by_name.title, None);
    }

    #[test]
    fn unmatched_participant_gets_unknown_identity() {
        let recovered = recover_appointment(wire("Visitor", Some("visitor@example.com")), &roster());
        let participant = &recovered.participants[0];
        assert!(participant.id.is_unknown());
        assert_eq!(participant.name, "Visitor");
        assert_eq!(participant.email, "visitor@example.com");
        assert!(!recovered.has_participant(ParticipantId::UNKNOWN));
    }

    #[test]
    fn projection_keeps_first_known_participant() {
        let mut participants = roster();
        participants.insert(
            0,
            Participant {
                id: ParticipantId::UNKNOWN,
                name: "Visitor".into(),
                email: String::new(),
            },
        );
        let fields = AppointmentFields {
            title: Some("sync".into()),
            description: None,
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
            participants,
        };

        let body = project_appointment(&fields).unwrap();
        assert_eq!(body.participant_id, 1);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["participantId"], 1);
        assert_eq!(json["startTime"], "2026-03-02T10:00:00Z");
    }

    #[test]
    fn projection_requires_a_known_participant() {
        let fields = AppointmentFields {
            title: None,
            description: None,
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
            participants: Vec::new(),
        };

        assert!(matches!(
            project_appointment(&fields),
            Err(RepoError::InvalidData(_))
        ));
    }
}
