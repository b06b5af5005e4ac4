use healthlog_core::{
    export_metrics_csv, open_db_in_memory, ImportFormat, ImportService, ImportServiceError,
    MedicationListQuery, MedicationRepository, MetricListQuery, MetricRepository, MetricSource,
    MetricType, RecordSchema, SqliteMedicationRepository, SqliteMetricRepository,
    ValidationError,
};
use std::fs;

#[test]
fn csv_import_persists_valid_rows_and_reports_rejections() {
    let conn = open_db_in_memory().unwrap();
    let payload = "metric_type,value,recorded_at\n\
                   steps,4000,2024-03-04T08:00\n\
                   steps,-12,2024-03-04T12:00\n\
                   calories,1800,2024-03-04T20:00\n";

    let report = ImportService::new(&conn)
        .import(payload, ImportFormat::Csv)
        .unwrap();
    assert_eq!(report.schema, Some(RecordSchema::MetricLong));
    assert_eq!(report.accepted_count(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row_index, 1);

    let stored = SqliteMetricRepository::try_new(&conn)
        .unwrap()
        .list_metrics(&MetricListQuery::default())
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored
        .iter()
        .all(|metric| metric.source == MetricSource::Import));
}

#[test]
fn reimporting_creates_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = ImportService::new(&conn);
    let payload = r#"[{"date": "2024-03-04", "steps": 8000, "calories": 2100}]"#;

    service.import(payload, ImportFormat::Json).unwrap();
    service.import(payload, ImportFormat::Json).unwrap();

    let steps = SqliteMetricRepository::try_new(&conn)
        .unwrap()
        .list_metrics(&MetricListQuery {
            metric_type: Some(MetricType::Steps),
            ..MetricListQuery::default()
        })
        .unwrap();
    assert_eq!(steps.len(), 2);
}

#[test]
fn xml_medication_import_stores_schedules() {
    let conn = open_db_in_memory().unwrap();
    let payload = "<medications>\
        <row><name>Metformin</name><dosage>500 mg</dosage><time>08:00</time>\
             <frequency>daily</frequency><person>Dad</person></row>\
        <row><name>Aspirin</name><dosage>81 mg</dosage><time>25:00</time></row>\
        </medications>";

    let report = ImportService::new(&conn)
        .import(payload, ImportFormat::Xml)
        .unwrap();
    assert_eq!(report.medication_ids.len(), 1);
    assert!(matches!(
        report.rejected[0].reason,
        ValidationError::InvalidFormat { field: "time", .. }
    ));

    let stored = SqliteMedicationRepository::try_new(&conn)
        .unwrap()
        .list_medications(&MedicationListQuery::default())
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].person, "Dad");
}

#[test]
fn payload_level_failure_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let err = ImportService::new(&conn)
        .import(r#"{"steps": 1}"#, ImportFormat::Json)
        .unwrap_err();
    assert!(matches!(err, ImportServiceError::Import(_)));
    assert!(SqliteMetricRepository::try_new(&conn)
        .unwrap()
        .list_metrics(&MetricListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn import_file_infers_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.csv");
    fs::write(&path, "date,steps,calories\n2024-03-04,8000,2100\n2024-03-05,,1900\n").unwrap();
    let conn = open_db_in_memory().unwrap();

    let report = ImportService::new(&conn).import_file(&path).unwrap();
    assert_eq!(report.schema, Some(RecordSchema::MetricWide));
    assert_eq!(report.metric_ids.len(), 3);

    let unknown = dir.path().join("upload.txt");
    fs::write(&unknown, "date,steps\n").unwrap();
    assert!(matches!(
        ImportService::new(&conn).import_file(&unknown),
        Err(ImportServiceError::UnknownFormat(_))
    ));
}

#[test]
fn exported_metrics_import_back() {
    let source = open_db_in_memory().unwrap();
    ImportService::new(&source)
        .import(
            "metric_type,value,recorded_at\nsteps,4000,2024-03-04T08:00\nwater_ml,750,2024-03-04T09:30\n",
            ImportFormat::Csv,
        )
        .unwrap();

    let mut exported = Vec::new();
    let rows = export_metrics_csv(
        &SqliteMetricRepository::try_new(&source).unwrap(),
        &MetricListQuery::default(),
        &mut exported,
    )
    .unwrap();
    assert_eq!(rows, 2);
    let exported = String::from_utf8(exported).unwrap();
    assert!(exported.starts_with("id,person,metric_type,value,recorded_at,source\n"));

    let target = open_db_in_memory().unwrap();
    let report = ImportService::new(&target)
        .import(&exported, ImportFormat::Csv)
        .unwrap();
    assert_eq!(report.metric_ids.len(), 2);
    assert!(report.rejected.is_empty());
}
