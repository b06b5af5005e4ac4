//! External payload normalization.
//!
//! # Responsibility
//! - Turn CSV, JSON or XML text into validated insert requests.
//! - Collect per-row rejections instead of failing the batch.
//!
//! # Invariants
//! - Schema is detected once per payload: from the CSV header, otherwise
//!   from the first well-formed record whose fields match a schema.
//!   Records that do not fit it are rejected individually.
//! - `row_index` is the 0-based data row; a CSV header is not a row.
//! - No duplicate detection. Importing a payload twice yields duplicates.
//! - Nothing here touches the store; see `service::import_service`.

mod csv_source;
mod json_source;
pub mod schema;
mod xml_source;

use crate::model::medication::NewMedication;
use crate::model::metric::NewMetric;
use crate::model::validation::ValidationError;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

pub use schema::{detect_schema, ImportedRecord, RawFields, RecordSchema};

/// Supported payload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
    Xml,
}

impl ImportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| extension.parse().ok())
    }
}

impl Display for ImportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(ValidationError::UnknownVariant {
                field: "format",
                value: value.trim().to_string(),
            }),
        }
    }
}

/// Payload-level failure; no rows were examined.
#[derive(Debug)]
pub enum ImportError {
    Csv(csv::Error),
    Json(serde_json::Error),
    Xml(String),
    /// JSON document is valid but not a top-level array.
    NotAnArray,
    /// Field names match none of the declared schemas.
    UnrecognizedSchema { fields: Vec<String> },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "invalid CSV payload: {err}"),
            Self::Json(err) => write!(f, "invalid JSON payload: {err}"),
            Self::Xml(details) => write!(f, "invalid XML payload: {details}"),
            Self::NotAnArray => write!(f, "JSON payload must be an array of records"),
            Self::UnrecognizedSchema { fields } => write!(
                f,
                "no known schema matches fields [{}]",
                fields.join(", ")
            ),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Xml(_) | Self::NotAnArray | Self::UnrecognizedSchema { .. } => None,
        }
    }
}

/// One rejected data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRowError {
    pub row_index: usize,
    pub reason: ValidationError,
}

impl Display for ImportRowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row_index, self.reason)
    }
}

/// Accepted records plus rejections, in payload order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    /// `None` only when the payload held no records at all.
    pub schema: Option<RecordSchema>,
    pub accepted: Vec<ImportedRecord>,
    pub rejected: Vec<ImportRowError>,
}

impl ImportOutcome {
    pub fn metrics(&self) -> impl Iterator<Item = &NewMetric> {
        self.accepted.iter().filter_map(|record| match record {
            ImportedRecord::Metric(metric) => Some(metric),
            ImportedRecord::Medication(_) => None,
        })
    }

    pub fn medications(&self) -> impl Iterator<Item = &NewMedication> {
        self.accepted.iter().filter_map(|record| match record {
            ImportedRecord::Medication(medication) => Some(medication),
            ImportedRecord::Metric(_) => None,
        })
    }
}

/// Rows as read from a payload, before schema coercion.
pub(crate) struct RawDocument {
    pub(crate) header: Option<Vec<String>>,
    pub(crate) rows: Vec<Result<RawFields, ValidationError>>,
}

/// Parses `payload` and validates every row against the detected schema.
///
/// # Errors
/// Returns [`ImportError`] when the document itself is unreadable or its
/// fields match no schema. Row problems land in `ImportOutcome::rejected`.
pub fn normalize(payload: &str, format: ImportFormat) -> Result<ImportOutcome, ImportError> {
    let document = match format {
        ImportFormat::Csv => csv_source::read_csv(payload)?,
        ImportFormat::Json => json_source::read_json(payload)?,
        ImportFormat::Xml => xml_source::read_xml(payload)?,
    };

    let schema = match &document.header {
        Some(header) => Some(
            detect_schema(header.iter().map(String::as_str)).ok_or_else(|| {
                ImportError::UnrecognizedSchema {
                    fields: header.clone(),
                }
            })?,
        ),
        None => detect_record_schema(&document.rows)?,
    };

    let mut outcome = ImportOutcome {
        schema,
        ..ImportOutcome::default()
    };
    for (row_index, row) in document.rows.into_iter().enumerate() {
        let coerced = match (row, schema) {
            (Ok(fields), Some(schema)) => schema.coerce(&fields),
            (Ok(_), None) => Err(ValidationError::MalformedRecord(
                "record has no fields".to_string(),
            )),
            (Err(reason), _) => Err(reason),
        };
        match coerced {
            Ok(records) => outcome.accepted.extend(records),
            Err(reason) => outcome.rejected.push(ImportRowError { row_index, reason }),
        }
    }

    info!(
        "event=import_normalize module=import status=ok format={} schema={} accepted={} rejected={}",
        format,
        schema.map_or("none", RecordSchema::as_str),
        outcome.accepted.len(),
        outcome.rejected.len()
    );
    Ok(outcome)
}

/// Picks the schema from the first well-formed record that matches one.
///
/// Records that match no schema are coerced against the chosen one and
/// rejected on their own. Fails only when no record matches at all.
fn detect_record_schema(
    rows: &[Result<RawFields, ValidationError>],
) -> Result<Option<RecordSchema>, ImportError> {
    let records = rows.iter().filter_map(|row| row.as_ref().ok());
    if let Some(schema) = records
        .clone()
        .find_map(|fields| detect_schema(fields.keys().map(String::as_str)))
    {
        return Ok(Some(schema));
    }

    let seen = records
        .flat_map(|fields| fields.keys().cloned())
        .collect::<BTreeSet<_>>();
    if seen.is_empty() {
        return Ok(None);
    }
    Err(ImportError::UnrecognizedSchema {
        fields: seen.into_iter().collect(),
    })
}
