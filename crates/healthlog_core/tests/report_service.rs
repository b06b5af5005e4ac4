use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use healthlog_core::{
    export_medications_csv, open_db_in_memory, GoalPeriod, GoalService, Insight,
    MedicationListQuery, MedicationService, MetricService, MetricType, NewMedication, NewMetric,
    ReportService, SqliteGoalRepository, SqliteMedicationRepository, SqliteMetricRepository,
};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 6)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

#[test]
fn report_combines_metrics_goals_and_adherence_for_one_person() {
    let conn = open_db_in_memory().unwrap();
    let metrics = MetricService::new(SqliteMetricRepository::try_new(&conn).unwrap());
    let medications = MedicationService::new(SqliteMedicationRepository::try_new(&conn).unwrap());
    let goals = GoalService::new(SqliteGoalRepository::try_new(&conn).unwrap());

    for offset in 0..3 {
        metrics
            .log_metric(&NewMetric::manual(
                MetricType::Steps,
                2_000.0,
                now() - Duration::days(offset),
            ))
            .unwrap();
    }
    metrics
        .log_metric(&NewMetric::manual(MetricType::Steps, 99_999.0, now()).for_person("Dad"))
        .unwrap();
    goals
        .set_goal(&MetricType::Calories, GoalPeriod::Daily, 1_800.0)
        .unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let morning = medications
        .add_medication(
            &NewMedication::new("Metformin", "500 mg", NaiveTime::from_hms_opt(8, 0, 0).unwrap())
                .starting(start),
        )
        .unwrap();
    medications
        .add_medication(
            &NewMedication::new("Atorvastatin", "20 mg", NaiveTime::from_hms_opt(21, 0, 0).unwrap())
                .starting(start),
        )
        .unwrap();
    medications.mark_taken(morning, now().date()).unwrap();

    let report = ReportService::new(&conn).build_report("Self", now()).unwrap();

    assert_eq!(report.person, "Self");
    assert_eq!(report.all_time.count, 3);
    assert_eq!(report.last_7_days.average_for(&MetricType::Steps), Some(2_000.0));
    assert_eq!(report.recent_metrics.len(), 3);
    assert_eq!((report.adherence.taken, report.adherence.scheduled), (1, 2));

    let calories = report
        .goal_progress
        .iter()
        .find(|progress| progress.metric_type == MetricType::Calories)
        .unwrap();
    assert_eq!(calories.target, 1_800.0);
    let steps = report
        .goal_progress
        .iter()
        .find(|progress| progress.metric_type == MetricType::Steps)
        .unwrap();
    assert_eq!(steps.target, 35_000.0);
    assert_eq!(steps.actual, 6_000.0);

    assert!(report.insights.contains(&Insight::LowAdherence { percent: 50.0 }));
    assert!(report
        .insights
        .iter()
        .any(|insight| matches!(insight, Insight::StepsBelowTarget { .. })));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["person"], "Self");
    assert_eq!(json["goal_progress"][0]["metric_type"], "steps");
}

#[test]
fn empty_store_yields_a_well_formed_report() {
    let conn = open_db_in_memory().unwrap();
    let report = ReportService::new(&conn).build_report("Self", now()).unwrap();

    assert_eq!(report.all_time.count, 0);
    assert!(report.recent_metrics.is_empty());
    assert_eq!(report.goal_progress.len(), 2);
    assert_eq!(
        report.insights,
        vec![Insight::NotEnoughData, Insight::NoMedicationSchedule]
    );
}

#[test]
fn medications_export_writes_header_and_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMedicationRepository::try_new(&conn).unwrap();
    let medications = MedicationService::new(SqliteMedicationRepository::try_new(&conn).unwrap());
    medications
        .add_medication(&NewMedication::new(
            "Ibuprofen, extra strength",
            "400 mg",
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        ))
        .unwrap();

    let mut out = Vec::new();
    let rows = export_medications_csv(&repo, &MedicationListQuery::default(), &mut out).unwrap();
    assert_eq!(rows, 1);

    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,person,name,dosage,time,frequency,start_date,caregiver_email,taken_on,created_at")
    );
    let row = lines.next().unwrap();
    assert!(row.contains("\"Ibuprofen, extra strength\",400 mg,12:00,daily"));
}
