//! Core domain logic for HealthLog.
//! This crate is the single source of truth for health record invariants.

pub mod config;
pub mod db;
pub mod dictionary;
pub mod import;
pub mod insight;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use dictionary::{
    DictionaryError, DrugDictionary, InteractionEntry, MedicationInfoEntry, Severity,
};
pub use import::{
    normalize, ImportError, ImportFormat, ImportOutcome, ImportRowError, ImportedRecord,
    RecordSchema,
};
pub use insight::adherence::{medication_adherence, Adherence};
pub use insight::advice::{derive_insights, Insight};
pub use insight::goal_progress::{goal_progress, GoalProgress};
pub use insight::report::HealthReport;
pub use insight::summary::{summarize, weekly_totals, MetricSummary, SummaryWindow, WeeklyTotal};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::goal::{Goal, GoalId, GoalPeriod};
pub use model::medication::{Frequency, Medication, MedicationId, NewMedication, DEFAULT_PERSON};
pub use model::metric::{Metric, MetricId, MetricSource, MetricType, NewMetric};
pub use model::validation::ValidationError;
pub use reminder::{due_reminders, DueReminder, DEFAULT_TOLERANCE_MINUTES};
pub use repo::error::{RepoError, RepoResult};
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::medication_repo::{
    MedicationListQuery, MedicationRepository, SqliteMedicationRepository,
};
pub use repo::metric_repo::{MetricListQuery, MetricRepository, SqliteMetricRepository};
pub use repo::people::list_people;
pub use service::export::{export_medications_csv, export_metrics_csv, ExportError};
pub use service::goal_service::GoalService;
pub use service::import_service::{ImportReport, ImportService, ImportServiceError};
pub use service::medication_service::MedicationService;
pub use service::metric_service::MetricService;
pub use service::report_service::ReportService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
