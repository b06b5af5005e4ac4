use chrono::{NaiveDate, NaiveTime};
use healthlog_core::{
    open_db, open_db_in_memory, Frequency, MedicationListQuery, MedicationRepository,
    MedicationService, NewMedication, RepoError, SqliteMedicationRepository, ValidationError,
};
use uuid::Uuid;

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[test]
fn add_then_list_returns_record_with_fresh_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();

    let first = repo
        .create_medication(&NewMedication::new("Metformin", "500 mg", time(8, 0)))
        .unwrap();
    let second = repo
        .create_medication(&NewMedication::new("Metformin", "500 mg", time(8, 0)))
        .unwrap();
    assert_ne!(first, second);

    let listed = repo
        .list_medications(&MedicationListQuery::default())
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first);
    assert_eq!(listed[0].name, "Metformin");
    assert_eq!(listed[0].frequency, Frequency::Daily);
    assert_eq!(listed[0].person, "Self");
    assert!(listed[0].taken_on.is_none());
    assert!(listed[0].created_at > 0);
}

#[test]
fn list_orders_by_time_of_day() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    for (name, at) in [("Evening", time(21, 0)), ("Morning", time(7, 30)), ("Noon", time(12, 0))] {
        repo.create_medication(&NewMedication::new(name, "1 tab", at))
            .unwrap();
    }

    let names = repo
        .list_medications(&MedicationListQuery::default())
        .unwrap()
        .into_iter()
        .map(|medication| medication.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Morning", "Noon", "Evening"]);
}

#[test]
fn blank_name_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();

    let err = repo
        .create_medication(&NewMedication::new("   ", "10 mg", time(9, 0)))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField("name"))
    ));
}

#[test]
fn mark_taken_and_clear_taken_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    let id = repo
        .create_medication(&NewMedication::new("Lisinopril", "10 mg", time(9, 0)))
        .unwrap();

    repo.mark_taken(id, day(4)).unwrap();
    let stored = repo.get_medication(id).unwrap().unwrap();
    assert!(stored.is_taken_on(day(4)));
    assert!(!stored.is_taken_on(day(5)));

    assert_eq!(repo.clear_taken(None).unwrap(), 1);
    assert_eq!(repo.clear_taken(None).unwrap(), 0);
    assert!(repo.get_medication(id).unwrap().unwrap().taken_on.is_none());
}

#[test]
fn operations_on_missing_ids_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        repo.mark_taken(missing, day(4)),
        Err(RepoError::NotFound {
            entity: "medication",
            ..
        })
    ));
    assert!(matches!(
        repo.remove_medication(missing),
        Err(RepoError::NotFound { .. })
    ));
    assert!(repo.get_medication(missing).unwrap().is_none());
}

#[test]
fn person_filter_and_reset() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    repo.create_medication(&NewMedication::new("Aspirin", "81 mg", time(8, 0)))
        .unwrap();
    repo.create_medication(
        &NewMedication::new("Levothyroxine", "50 mcg", time(6, 30)).for_person("Mom"),
    )
    .unwrap();

    let moms = repo
        .list_medications(&MedicationListQuery {
            person: Some("Mom".to_string()),
        })
        .unwrap();
    assert_eq!(moms.len(), 1);
    assert_eq!(moms[0].name, "Levothyroxine");

    assert_eq!(
        healthlog_core::list_people(&conn).unwrap(),
        vec!["Mom".to_string(), "Self".to_string()]
    );

    assert_eq!(repo.reset_medications().unwrap(), 2);
    assert!(repo
        .list_medications(&MedicationListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn start_date_defaults_to_creation_day_and_explicit_value_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    let explicit = repo
        .create_medication(
            &NewMedication::new("Vitamin D", "1000 IU", time(8, 0))
                .with_frequency(Frequency::Weekly)
                .starting(day(4)),
        )
        .unwrap();
    let implicit = repo
        .create_medication(&NewMedication::new("Aspirin", "81 mg", time(8, 0)))
        .unwrap();

    let explicit = repo.get_medication(explicit).unwrap().unwrap();
    assert_eq!(explicit.start_date, day(4));
    assert_eq!(explicit.frequency, Frequency::Weekly);

    let implicit = repo.get_medication(implicit).unwrap().unwrap();
    assert_eq!(implicit.start_date, chrono::Local::now().date_naive());
}

#[test]
fn service_due_reminders_drop_taken_dose() {
    let conn = open_db_in_memory().unwrap();
    let service = MedicationService::new(SqliteMedicationRepository::try_new(&conn).unwrap());
    let id = service
        .add_medication(&NewMedication::new("Metformin", "500 mg", time(8, 0)).starting(day(1)))
        .unwrap();
    let query = MedicationListQuery::default();
    let now = day(4).and_time(time(8, 10));

    let due = service.due_reminders(&query, now, 15).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].medication.id, id);
    assert_eq!(due[0].offset_minutes, 10);

    service.mark_taken(id, day(4)).unwrap();
    assert!(service.due_reminders(&query, now, 15).unwrap().is_empty());

    let adherence = service.adherence(&query, day(4)).unwrap();
    assert_eq!((adherence.taken, adherence.scheduled), (1, 1));
}

#[test]
fn service_screens_stored_medications_for_interactions() {
    let conn = open_db_in_memory().unwrap();
    let service = MedicationService::new(SqliteMedicationRepository::try_new(&conn).unwrap());
    service
        .add_medication(&NewMedication::new("warfarin", "5 mg", time(18, 0)))
        .unwrap();
    service
        .add_medication(&NewMedication::new("Aspirin", "81 mg", time(8, 0)))
        .unwrap();

    let dictionary = healthlog_core::DrugDictionary::builtin().unwrap();
    let warnings = service
        .interaction_warnings(&MedicationListQuery::default(), &dictionary)
        .unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, healthlog_core::Severity::High);
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("healthlog.db");

    let id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
        repo.create_medication(&NewMedication::new("Atorvastatin", "20 mg", time(22, 0)))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    let stored = repo.get_medication(id).unwrap().unwrap();
    assert_eq!(stored.dosage, "20 mg");
    assert_eq!(stored.time_of_day, time(22, 0));
}
