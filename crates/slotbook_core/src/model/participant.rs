//! Participant domain model.
//!
//! # Responsibility
//! - Define the roster record referenced by appointments.
//! - Validate operator input before it reaches persistence.
//!
//! # Invariants
//! - `id` is unique within the roster and never reassigned.
//! - `ParticipantId::UNKNOWN` only appears on records recovered from a lossy
//!   backend and never identifies a roster entry.
//! - `name` is non-blank and `email` matches `local@domain.tld`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Integer identity of a roster participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl ParticipantId {
    /// Placeholder identity for participants a backend could not identify.
    ///
    /// Records carrying this id are display-only: they must not be matched
    /// against roster ids or used for conflict detection.
    pub const UNKNOWN: ParticipantId = ParticipantId(-1);

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
}

impl Participant {
    pub fn new(id: ParticipantId, fields: NewParticipant) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
        }
    }

    /// Checks roster field rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_participant_fields(&self.name, &self.email)
    }
}

/// Operator input for creating or editing a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    pub email: String,
}

impl NewParticipant {
    /// Builds trimmed input fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_participant_fields(&self.name, &self.email)
    }
}

/// Input rule violations, raised before any persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank after trim.
    MissingField(&'static str),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Appointment has no participants selected.
    NoParticipants,
    /// `end_time` is not strictly after `start_time`.
    EndNotAfterStart,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::NoParticipants => write!(f, "at least one participant must be selected"),
            Self::EndNotAfterStart => write!(f, "end_time must be after start_time"),
        }
    }
}

impl Error for ValidationError {}

fn validate_participant_fields(name: &str, email: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if email.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(ValidationError::InvalidEmail(email.trim().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewParticipant, ParticipantId, ValidationError};

    #[test]
    fn new_participant_trims_fields() {
        let fields = NewParticipant::new("  Ada  ", " ada@example.com ");
        assert_eq!(fields.name, "Ada");
        assert_eq!(fields.email, "ada@example.com");
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_email() {
        assert_eq!(
            NewParticipant::new(" ", "ada@example.com").validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            NewParticipant::new("Ada", "").validate(),
            Err(ValidationError::MissingField("email"))
        );
        assert!(matches!(
            NewParticipant::new("Ada", "ada@example").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            NewParticipant::new("Ada", "ada @example.com").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn unknown_id_is_flagged() {
        assert!(ParticipantId::UNKNOWN.is_unknown());
        assert!(!ParticipantId(42).is_unknown());
    }
}
