//! Collection-store backed repository.
//!
//! # Responsibility
//! - Implement participant/appointment CRUD as whole-collection
//!   read/compute/replace cycles over a `CollectionStore`.
//! - Keep embedded participant copies in appointments consistent with the
//!   roster on update and delete.
//!
//! # Invariants
//! - Every write persists complete collections; multi-collection changes
//!   go through one `write_all` call.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::model::participant::{NewParticipant, Participant, ParticipantId};
use crate::repo::ids::IdGenerator;
use crate::repo::{AppointmentRepository, ParticipantRepository, RepoError, RepoResult};
use crate::store::{CollectionKey, CollectionStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Repository over any `CollectionStore` (SQLite, memory).
pub struct CollectionRepository<S: CollectionStore> {
    store: S,
    ids: IdGenerator,
}

impl<S: CollectionStore> CollectionRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
        }
    }

    fn load_participants(&self) -> RepoResult<Vec<Participant>> {
        load_collection(&self.store, CollectionKey::Participants)
    }

    fn load_appointments(&self) -> RepoResult<Vec<Appointment>> {
        let appointments: Vec<Appointment> =
            load_collection(&self.store, CollectionKey::Appointments)?;
        for appointment in &appointments {
            appointment.validate().map_err(|err| {
                RepoError::InvalidData(format!(
                    "appointment {} in `{}`: {err}",
                    appointment.id,
                    CollectionKey::Appointments
                ))
            })?;
        }
        Ok(appointments)
    }
}

impl<S: CollectionStore> ParticipantRepository for CollectionRepository<S> {
    fn list_participants(&self) -> RepoResult<Vec<Participant>> {
        self.load_participants()
    }

    fn create_participant(&self, fields: &NewParticipant) -> RepoResult<Participant> {
        fields.validate()?;

        let mut participants = self.load_participants()?;
        let id = self.ids.next_id(|candidate| {
            participants
                .iter()
                .any(|participant| participant.id.0 == candidate)
        });
        let participant = Participant::new(ParticipantId(id), fields.clone());
        participants.push(participant.clone());

        self.store.write(
            CollectionKey::Participants,
            encode_collection(&participants)?,
        )?;
        Ok(participant)
    }

    fn update_participant(&self, participant: &Participant) -> RepoResult<Participant> {
        participant.validate()?;

        let mut participants = self.load_participants()?;
        let slot = participants
            .iter_mut()
            .find(|existing| existing.id == participant.id)
            .ok_or(RepoError::ParticipantNotFound(participant.id))?;
        *slot = participant.clone();

        let mut appointments = self.load_appointments()?;
        for appointment in &mut appointments {
            for embedded in &mut appointment.participants {
                if embedded.id == participant.id {
                    *embedded = participant.clone();
                }
            }
        }

        self.store.write_all(&[
            (
                CollectionKey::Participants,
                encode_collection(&participants)?,
            ),
            (
                CollectionKey::Appointments,
                encode_collection(&appointments)?,
            ),
        ])?;
        Ok(participant.clone())
    }

    fn delete_participant(&self, id: ParticipantId) -> RepoResult<()> {
        let mut participants = self.load_participants()?;
        let mut appointments = self.load_appointments()?;

        let before = participants.len();
        participants.retain(|participant| participant.id != id);
        let mut detached = 0usize;
        for appointment in &mut appointments {
            if appointment.remove_participant(id) {
                detached += 1;
            }
        }

        if before == participants.len() && detached == 0 {
            return Ok(());
        }

        self.store.write_all(&[
            (
                CollectionKey::Participants,
                encode_collection(&participants)?,
            ),
            (
                CollectionKey::Appointments,
                encode_collection(&appointments)?,
            ),
        ])?;
        Ok(())
    }
}

impl<S: CollectionStore> AppointmentRepository for CollectionRepository<S> {
    fn list_appointments(&self) -> RepoResult<Vec<Appointment>> {
        self.load_appointments()
    }

    fn create_appointment(&self, fields: &AppointmentFields) -> RepoResult<Appointment> {
        let mut appointments = self.load_appointments()?;
        let id = self.ids.next_id(|candidate| {
            appointments
                .iter()
                .any(|appointment| appointment.id.0 == candidate)
        });
        let appointment = Appointment::from_fields(AppointmentId(id), fields.clone());
        appointment.validate()?;
        appointments.push(appointment.clone());

        self.store.write(
            CollectionKey::Appointments,
            encode_collection(&appointments)?,
        )?;
        Ok(appointment)
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<Appointment> {
        appointment.validate()?;

        let mut appointments = self.load_appointments()?;
        let slot = appointments
            .iter_mut()
            .find(|existing| existing.id == appointment.id)
            .ok_or(RepoError::AppointmentNotFound(appointment.id))?;
        *slot = appointment.clone();

        self.store.write(
            CollectionKey::Appointments,
            encode_collection(&appointments)?,
        )?;
        Ok(appointment.clone())
    }

    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<()> {
        let mut appointments = self.load_appointments()?;
        let before = appointments.len();
        appointments.retain(|appointment| appointment.id != id);
        if before == appointments.len() {
            return Ok(());
        }

        self.store.write(
            CollectionKey::Appointments,
            encode_collection(&appointments)?,
        )?;
        Ok(())
    }
}

fn load_collection<T: DeserializeOwned>(
    store: &impl CollectionStore,
    key: CollectionKey,
) -> RepoResult<Vec<T>> {
    match store.read(key)? {
        Some(value) => serde_json::from_value(value)
            .map_err(|err| RepoError::InvalidData(format!("collection `{key}`: {err}"))),
        None => Ok(Vec::new()),
    }
}

fn encode_collection<T: Serialize>(items: &[T]) -> RepoResult<Value> {
    serde_json::to_value(items)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode collection: {err}")))
}
