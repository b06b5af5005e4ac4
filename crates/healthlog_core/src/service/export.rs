//! CSV export of stored rows.
//!
//! Column order is fixed; times and dates use the storage encodings so an
//! exported metrics file can be imported again.

use crate::model::datetime::{format_date, format_time, format_timestamp};
use crate::repo::error::RepoError;
use crate::repo::medication_repo::{MedicationListQuery, MedicationRepository};
use crate::repo::metric_repo::{MetricListQuery, MetricRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

const MEDICATION_HEADER: &[&str] = &[
    "id",
    "person",
    "name",
    "dosage",
    "time",
    "frequency",
    "start_date",
    "caregiver_email",
    "taken_on",
    "created_at",
];

const METRIC_HEADER: &[&str] = &["id", "person", "metric_type", "value", "recorded_at", "source"];

#[derive(Debug)]
pub enum ExportError {
    Repo(RepoError),
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "csv export failed: {err}"),
            Self::Io(err) => write!(f, "csv export failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Writes medications matching `query` as CSV. Returns the row count.
pub fn export_medications_csv<R, W>(
    repo: &R,
    query: &MedicationListQuery,
    writer: W,
) -> Result<usize, ExportError>
where
    R: MedicationRepository,
    W: Write,
{
    let medications = repo.list_medications(query)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(MEDICATION_HEADER)?;
    for medication in &medications {
        csv_writer.write_record([
            medication.id.to_string(),
            medication.person.clone(),
            medication.name.clone(),
            medication.dosage.clone(),
            format_time(medication.time_of_day),
            medication.frequency.as_str().to_string(),
            format_date(medication.start_date),
            medication.caregiver_email.clone().unwrap_or_default(),
            medication.taken_on.map(format_date).unwrap_or_default(),
            medication.created_at.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(medications.len())
}

/// Writes metrics matching `query` as CSV, oldest first. Returns the row count.
pub fn export_metrics_csv<R, W>(
    repo: &R,
    query: &MetricListQuery,
    writer: W,
) -> Result<usize, ExportError>
where
    R: MetricRepository,
    W: Write,
{
    let metrics = repo.list_metrics(query)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(METRIC_HEADER)?;
    for metric in &metrics {
        csv_writer.write_record([
            metric.id.to_string(),
            metric.person.clone(),
            metric.metric_type.as_str().to_string(),
            metric.value.to_string(),
            format_timestamp(metric.recorded_at),
            metric.source.as_str().to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(metrics.len())
}
