//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, store, evaluator and engine end to end.
//! - Keep output plain for quick local sanity checks.
//!
//! Usage: `healthlog_cli [payload.csv|payload.json|payload.xml]`

use healthlog_core::{
    core_version, init_logging, open_db, CoreConfig, DrugDictionary, ImportService,
    MedicationListQuery, MedicationService, MetricListQuery, MetricService, MetricType,
    SqliteMedicationRepository, SqliteMetricRepository, SummaryWindow,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report_failure(&*err));
            ExitCode::FAILURE
        }
    }
}

fn report_failure(err: &dyn Error) -> String {
    let mut depth = 0;
    let mut source = err.source();
    while let Some(next) = source {
        depth += 1;
        source = next.source();
    }
    log::error!("event=cli_run module=cli status=error source_depth={depth}");
    format!("healthlog_cli error: {err}")
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging(&config)?;
    log::info!("event=cli_run module=cli status=start");
    println!("healthlog_core version={}", core_version());

    let conn = open_db(&config.db_path)?;
    let now = chrono::Local::now().naive_local();

    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        let report = ImportService::new(&conn).import_file(&path)?;
        println!(
            "import accepted={} rejected={}",
            report.accepted_count(),
            report.rejected.len()
        );
        for rejection in &report.rejected {
            println!("  {rejection}");
        }
    }

    let medications = MedicationService::new(SqliteMedicationRepository::try_new(&conn)?);
    let everyone = MedicationListQuery::default();
    let due = medications.due_reminders(&everyone, now, config.reminder_tolerance_minutes)?;
    println!("due reminders={}", due.len());
    for reminder in &due {
        println!(
            "  {} {} {} ({:+} min)",
            reminder.scheduled_at.format("%H:%M"),
            reminder.medication.name,
            reminder.medication.dosage,
            reminder.offset_minutes
        );
    }

    let dictionary = DrugDictionary::from_config(&config)?;
    for entry in medications.interaction_warnings(&everyone, &dictionary)? {
        println!(
            "  interaction {} + {}: {}",
            entry.drug_a, entry.drug_b, entry.severity
        );
    }

    let metrics = MetricService::new(SqliteMetricRepository::try_new(&conn)?);
    let summary = metrics.summarize(&MetricListQuery::default(), SummaryWindow::Last7Days, now)?;
    println!("last 7 days metrics={}", summary.count);
    for metric_type in [MetricType::Steps, MetricType::Calories] {
        match summary.average_for(&metric_type) {
            Some(average) => println!(
                "  {metric_type} total={:.0} average={average:.1}",
                summary.total_for(&metric_type)
            ),
            None => println!("  {metric_type} no data"),
        }
    }

    log::info!("event=cli_run module=cli status=ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::report_failure;
    use healthlog_core::ConfigError;

    #[test]
    fn failure_message_carries_the_error_text() {
        let err = ConfigError::OutOfRange {
            key: "HEALTHLOG_REMINDER_TOLERANCE_MINUTES",
            value: 5000,
            max: 1440,
        };
        let message = report_failure(&err);
        assert!(message.starts_with("healthlog_cli error: "));
        assert!(message.ends_with(&err.to_string()));
    }
}
