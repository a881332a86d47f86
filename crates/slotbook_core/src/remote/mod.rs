//! Remote HTTP backend adapter.
//!
//! # Responsibility
//! - Implement the repository contracts against a REST backend exposing
//!   `/participants` and `/appointments`.
//! - Translate the backend's single-participant appointment shape (see
//!   `wire`).
//!
//! # Invariants
//! - Every request is bounded by the configured timeout.
//! - Non-success statuses surface as `RepoError::Backend`, except `404` on
//!   delete (no-op) and on update (`*NotFound`).
//! - Cascading participant deletion is the backend's responsibility.
//!
//! # Known limitation
//! - Appointments whose participant cannot be matched against the roster
//!   carry `ParticipantId::UNKNOWN` and are invisible to conflict checks.

use crate::model::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::model::participant::{NewParticipant, Participant, ParticipantId};
use crate::repo::{AppointmentRepository, ParticipantRepository, RepoError, RepoResult};
use log::{debug, error};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub mod wire;

use wire::{
    project_appointment, recover_appointment, WireAppointment, WireParticipant,
    WireParticipantBody,
};

const PARTICIPANTS_PATH: &str = "/participants";
const APPOINTMENTS_PATH: &str = "/appointments";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Connection settings for the remote backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8080/api`.
    pub base_url: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

/// Repository backed by the remote REST API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &RemoteConfig) -> RepoResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    fn send(&self, method: Method, path: &str, request: RequestBuilder) -> RepoResult<Response> {
        let started_at = Instant::now();
        match request.send() {
            Ok(response) => {
                debug!(
                    "event=backend_request module=remote status=ok method={} path={} http_status={} duration_ms={}",
                    method,
                    path,
                    response.status().as_u16(),
                    started_at.elapsed().as_millis()
                );
                Ok(response)
            }
            Err(err) => {
                error!(
                    "event=backend_request module=remote status=error method={} path={} duration_ms={} error={}",
                    method,
                    path,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> RepoResult<T> {
        let response = self.send(Method::GET, path, self.request(Method::GET, path))?;
        Ok(ensure_success(response)?.json()?)
    }

    fn delete(&self, path: &str) -> RepoResult<()> {
        let response = self.send(Method::DELETE, path, self.request(Method::DELETE, path))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response)?;
        Ok(())
    }
}

impl ParticipantRepository for HttpBackend {
    fn list_participants(&self) -> RepoResult<Vec<Participant>> {
        let participants: Vec<WireParticipant> = self.get_json(PARTICIPANTS_PATH)?;
        Ok(participants.into_iter().map(Participant::from).collect())
    }

    fn create_participant(&self, fields: &NewParticipant) -> RepoResult<Participant> {
        fields.validate()?;
        let body = WireParticipantBody {
            name: &fields.name,
            email: &fields.email,
        };
        let request = self.request(Method::POST, PARTICIPANTS_PATH).json(&body);
        let response = self.send(Method::POST, PARTICIPANTS_PATH, request)?;
        let created: WireParticipant = ensure_success(response)?.json()?;
        Ok(created.into())
    }

    fn update_participant(&self, participant: &Participant) -> RepoResult<Participant> {
        participant.validate()?;
        let path = format!("{PARTICIPANTS_PATH}/{}", participant.id);
        let body = WireParticipantBody {
            name: &participant.name,
            email: &participant.email,
        };
        let request = self.request(Method::PUT, &path).json(&body);
        let response = self.send(Method::PUT, &path, request)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepoError::ParticipantNotFound(participant.id));
        }
        let updated: WireParticipant = ensure_success(response)?.json()?;
        Ok(updated.into())
    }

    fn delete_participant(&self, id: ParticipantId) -> RepoResult<()> {
        self.delete(&format!("{PARTICIPANTS_PATH}/{id}"))
    }
}

impl AppointmentRepository for HttpBackend {
    fn list_appointments(&self) -> RepoResult<Vec<Appointment>> {
        let roster = self.list_participants()?;
        let appointments: Vec<WireAppointment> = self.get_json(APPOINTMENTS_PATH)?;
        Ok(appointments
            .into_iter()
            .map(|appointment| recover_appointment(appointment, &roster))
            .collect())
    }

    fn create_appointment(&self, fields: &AppointmentFields) -> RepoResult<Appointment> {
        let body = project_appointment(fields)?;
        let request = self.request(Method::POST, APPOINTMENTS_PATH).json(&body);
        let response = self.send(Method::POST, APPOINTMENTS_PATH, request)?;
        let created: WireAppointment = ensure_success(response)?.json()?;
        Ok(recover_appointment(created, &fields.participants))
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<Appointment> {
        appointment.validate()?;
        let fields = AppointmentFields {
            title: appointment.title.clone(),
            description: appointment.description.clone(),
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            participants: appointment.participants.clone(),
        };
        let body = project_appointment(&fields)?;
        let path = format!("{APPOINTMENTS_PATH}/{}", appointment.id);
        let request = self.request(Method::PUT, &path).json(&body);
        let response = self.send(Method::PUT, &path, request)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepoError::AppointmentNotFound(appointment.id));
        }
        let updated: WireAppointment = ensure_success(response)?.json()?;
        Ok(recover_appointment(updated, &appointment.participants))
    }

    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<()> {
        self.delete(&format!("{APPOINTMENTS_PATH}/{id}"))
    }
}

fn ensure_success(response: Response) -> RepoResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = body
        .replace(['\n', '\r'], " ")
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect::<String>();
    Err(RepoError::Backend {
        status: status.as_u16(),
        message,
    })
}
