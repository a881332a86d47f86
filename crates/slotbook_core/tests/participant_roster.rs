use chrono::{DateTime, TimeZone, Utc};
use slotbook_core::store::open_store_in_memory;
use slotbook_core::{
    AppointmentDraft, CollectionRepository, MemoryStore, NewParticipant, ParticipantId,
    ScheduleService, ServiceError, SqliteCollectionStore, ValidationError,
};
use std::collections::HashSet;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
}

fn memory_service() -> ScheduleService<CollectionRepository<MemoryStore>> {
    ScheduleService::new(CollectionRepository::new(MemoryStore::new()))
}

#[test]
fn create_then_list_contains_exactly_one_matching_entry() {
    let service = memory_service();
    let before = service.list_participants().unwrap();
    assert!(before.is_empty());

    let created = service
        .create_participant(NewParticipant::new("Ada Lovelace", "ada@example.com"))
        .unwrap();

    let listed = service.list_participants().unwrap();
    let matching: Vec<_> = listed
        .iter()
        .filter(|participant| {
            participant.name == "Ada Lovelace" && participant.email == "ada@example.com"
        })
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
}

#[test]
fn participant_ids_are_unique() {
    let service = memory_service();
    let mut seen = HashSet::new();
    for index in 0..20 {
        let participant = service
            .create_participant(NewParticipant::new(
                format!("Person {index}"),
                format!("person{index}@example.com"),
            ))
            .unwrap();
        assert!(seen.insert(participant.id), "duplicate id {}", participant.id);
    }
}

#[test]
fn invalid_input_is_rejected_before_persistence() {
    let service = memory_service();

    let err = service
        .create_participant(NewParticipant::new("Ada", "not-an-email"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::InvalidEmail(_))
    ));

    let err = service
        .create_participant(NewParticipant::new("", "ada@example.com"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingField("name"))
    ));

    assert!(service.list_participants().unwrap().is_empty());
}

#[test]
fn update_replaces_record_and_refreshes_embedded_copies() {
    let service = memory_service();
    let ada = service
        .create_participant(NewParticipant::new("Ada", "ada@example.com"))
        .unwrap();
    let booked = service
        .create_appointment(&AppointmentDraft::new(
            Some("review".into()),
            at(10, 0),
            at(11, 0),
            vec![ada.id],
        ))
        .unwrap();
    assert!(booked.is_scheduled());

    let renamed = service
        .update_participant(ada.id, NewParticipant::new("Ada King", "ada.king@example.com"))
        .unwrap();
    assert_eq!(renamed.id, ada.id);
    assert_eq!(renamed.name, "Ada King");

    let listed = service.list_participants().unwrap();
    assert_eq!(listed, vec![renamed.clone()]);

    let appointments = service.list_appointments().unwrap();
    assert_eq!(appointments[0].participants, vec![renamed]);
}

#[test]
fn update_missing_participant_returns_not_found() {
    let service = memory_service();
    let err = service
        .update_participant(ParticipantId(404), NewParticipant::new("Ghost", "ghost@example.com"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ParticipantNotFound(ParticipantId(404))));
}

#[test]
fn delete_cascades_without_deleting_appointments() {
    let conn = open_store_in_memory().unwrap();
    let service = ScheduleService::new(CollectionRepository::new(SqliteCollectionStore::new(
        &conn,
    )));

    let ada = service
        .create_participant(NewParticipant::new("Ada", "ada@example.com"))
        .unwrap();
    let bob = service
        .create_participant(NewParticipant::new("Bob", "bob@example.com"))
        .unwrap();

    service
        .create_appointment(&AppointmentDraft::new(
            Some("pairing".into()),
            at(9, 0),
            at(10, 0),
            vec![ada.id, bob.id],
        ))
        .unwrap();
    service
        .create_appointment(&AppointmentDraft::new(
            Some("one on one".into()),
            at(13, 0),
            at(14, 0),
            vec![ada.id],
        ))
        .unwrap();

    service.delete_participant(ada.id).unwrap();

    let participants = service.list_participants().unwrap();
    assert_eq!(participants, vec![bob.clone()]);

    let appointments = service.list_appointments().unwrap();
    assert_eq!(appointments.len(), 2);
    assert!(appointments
        .iter()
        .all(|appointment| !appointment.has_participant(ada.id)));
    assert_eq!(appointments[0].participants, vec![bob]);
    assert!(appointments[1].participants.is_empty());
}

#[test]
fn deleting_missing_participant_is_a_no_op() {
    let service = memory_service();
    let ada = service
        .create_participant(NewParticipant::new("Ada", "ada@example.com"))
        .unwrap();

    service.delete_participant(ParticipantId(12345)).unwrap();

    assert_eq!(service.list_participants().unwrap(), vec![ada]);
}
