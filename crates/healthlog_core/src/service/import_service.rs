//! Import use-case: normalize a payload, then persist accepted records.
//!
//! # Invariants
//! - Accepted records are written in one immediate transaction; either all
//!   of them land or none do.
//! - Rejected rows are returned, never written.

use crate::import::{normalize, ImportError, ImportFormat, ImportRowError, ImportedRecord, RecordSchema};
use crate::model::medication::MedicationId;
use crate::model::metric::MetricId;
use crate::repo::error::RepoError;
use crate::repo::medication_repo::{MedicationRepository, SqliteMedicationRepository};
use crate::repo::metric_repo::{MetricRepository, SqliteMetricRepository};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug)]
pub enum ImportServiceError {
    Io {
        path: String,
        source: std::io::Error,
    },
    /// File extension is not `csv`, `json` or `xml`.
    UnknownFormat(String),
    Import(ImportError),
    Repo(RepoError),
}

impl Display for ImportServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{path}`: {source}"),
            Self::UnknownFormat(path) => write!(f, "cannot infer import format for `{path}`"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Import(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnknownFormat(_) => None,
        }
    }
}

impl From<ImportError> for ImportServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepoError> for ImportServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ImportServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// What one import wrote and what it skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub schema: Option<RecordSchema>,
    pub metric_ids: Vec<MetricId>,
    pub medication_ids: Vec<MedicationId>,
    pub rejected: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn accepted_count(&self) -> usize {
        self.metric_ids.len() + self.medication_ids.len()
    }
}

pub struct ImportService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ImportService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Normalizes `payload` and stores every accepted record.
    pub fn import(
        &self,
        payload: &str,
        format: ImportFormat,
    ) -> Result<ImportReport, ImportServiceError> {
        let outcome = normalize(payload, format)?;
        let mut report = ImportReport {
            schema: outcome.schema,
            rejected: outcome.rejected,
            ..ImportReport::default()
        };

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        {
            let metrics = SqliteMetricRepository::try_new(&tx)?;
            let medications = SqliteMedicationRepository::try_new(&tx)?;
            for record in &outcome.accepted {
                match record {
                    ImportedRecord::Metric(metric) => {
                        report.metric_ids.push(metrics.create_metric(metric)?);
                    }
                    ImportedRecord::Medication(medication) => {
                        report
                            .medication_ids
                            .push(medications.create_medication(medication)?);
                    }
                }
            }
        }
        if let Err(err) = tx.commit() {
            error!("event=import_commit module=service status=error format={format}");
            return Err(err.into());
        }

        info!(
            "event=import_commit module=service status=ok format={} metrics={} medications={} rejected={}",
            format,
            report.metric_ids.len(),
            report.medication_ids.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// Reads `path`, infers the format from its extension and imports it.
    pub fn import_file(&self, path: &Path) -> Result<ImportReport, ImportServiceError> {
        let format = ImportFormat::from_path(path)
            .ok_or_else(|| ImportServiceError::UnknownFormat(path.display().to_string()))?;
        let payload = std::fs::read_to_string(path).map_err(|source| ImportServiceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.import(&payload, format)
    }
}
