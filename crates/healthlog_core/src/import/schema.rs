//! Declared import schemas and row coercion.
//!
//! # Invariants
//! - Field names are compared after [`normalize_field_name`].
//! - Empty values are treated as absent.
//! - Coercion of one row yields either all of its records or one reason.

use crate::model::datetime::{parse_date, parse_time_of_day, parse_timestamp};
use crate::model::medication::{Frequency, NewMedication, DEFAULT_PERSON};
use crate::model::metric::{MetricSource, MetricType, NewMetric};
use crate::model::validation::ValidationError;
use serde::Serialize;
use std::collections::BTreeMap;

/// One loosely typed row keyed by normalized field name.
pub type RawFields = BTreeMap<String, String>;

const FIELD_ALIASES: &[(&str, &str)] = &[
    ("type", "metric_type"),
    ("timestamp", "recorded_at"),
    ("time_of_day", "time"),
];

/// Record layouts the normalizer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSchema {
    /// One metric per row: `metric_type`, `value`, `recorded_at`.
    MetricLong,
    /// `date` plus `steps` and/or `calories` columns.
    MetricWide,
    /// `name`, `dosage`, `time`.
    Medication,
}

/// A validated record ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedRecord {
    Metric(NewMetric),
    Medication(NewMedication),
}

/// Lowercases, trims, maps `-` and spaces to `_`, then resolves aliases.
pub fn normalize_field_name(name: &str) -> String {
    let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(normalized)
}

/// Picks the schema implied by a set of normalized field names.
pub fn detect_schema<'a, I>(fields: I) -> Option<RecordSchema>
where
    I: IntoIterator<Item = &'a str>,
{
    let fields = fields.into_iter().collect::<Vec<_>>();
    let has = |name: &str| fields.iter().any(|field| *field == name);

    if has("metric_type") {
        Some(RecordSchema::MetricLong)
    } else if has("date") && (has("steps") || has("calories")) {
        Some(RecordSchema::MetricWide)
    } else if has("name") {
        Some(RecordSchema::Medication)
    } else {
        None
    }
}

impl RecordSchema {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetricLong => "metric_long",
            Self::MetricWide => "metric_wide",
            Self::Medication => "medication",
        }
    }

    /// Converts one row into validated records.
    pub fn coerce(self, row: &RawFields) -> Result<Vec<ImportedRecord>, ValidationError> {
        match self {
            Self::MetricLong => coerce_metric_long(row).map(|metric| vec![metric]),
            Self::MetricWide => coerce_metric_wide(row),
            Self::Medication => coerce_medication(row).map(|medication| vec![medication]),
        }
    }
}

fn field<'a>(row: &'a RawFields, name: &str) -> Option<&'a str> {
    row.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required<'a>(row: &'a RawFields, name: &'static str) -> Result<&'a str, ValidationError> {
    field(row, name).ok_or(ValidationError::MissingField(name))
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    value
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
            expected: "a number",
        })
}

fn person(row: &RawFields) -> String {
    field(row, "person").unwrap_or(DEFAULT_PERSON).to_string()
}

fn coerce_metric_long(row: &RawFields) -> Result<ImportedRecord, ValidationError> {
    let metric_type = required(row, "metric_type")?.parse::<MetricType>()?;
    let value = parse_number("value", required(row, "value")?)?;
    let recorded_at = parse_timestamp("recorded_at", required(row, "recorded_at")?)?;
    let source = match field(row, "source") {
        Some(source) => source.parse::<MetricSource>()?,
        None => MetricSource::Import,
    };

    let metric = NewMetric {
        person: person(row),
        metric_type,
        value,
        recorded_at,
        source,
    }
    .normalized()?;
    Ok(ImportedRecord::Metric(metric))
}

fn coerce_metric_wide(row: &RawFields) -> Result<Vec<ImportedRecord>, ValidationError> {
    let recorded_at = parse_timestamp("date", required(row, "date")?)?;
    let person = person(row);

    let mut records = Vec::new();
    let columns = [("steps", MetricType::Steps), ("calories", MetricType::Calories)];
    for (column, metric_type) in columns {
        let Some(raw) = field(row, column) else {
            continue;
        };
        let metric = NewMetric {
            person: person.clone(),
            metric_type,
            value: parse_number(column, raw)?,
            recorded_at,
            source: MetricSource::Import,
        }
        .normalized()?;
        records.push(ImportedRecord::Metric(metric));
    }

    if records.is_empty() {
        return Err(ValidationError::MissingField("steps"));
    }
    Ok(records)
}

fn coerce_medication(row: &RawFields) -> Result<ImportedRecord, ValidationError> {
    let name = required(row, "name")?;
    let dosage = required(row, "dosage")?;
    let time_of_day = parse_time_of_day("time", required(row, "time")?)?;
    let frequency = match field(row, "frequency") {
        Some(frequency) => frequency.parse::<Frequency>()?,
        None => Frequency::Daily,
    };
    let start_date = field(row, "start_date")
        .map(|value| parse_date("start_date", value))
        .transpose()?;

    let medication = NewMedication {
        person: person(row),
        name: name.to_string(),
        dosage: dosage.to_string(),
        time_of_day,
        frequency,
        start_date,
        caregiver_email: field(row, "caregiver_email").map(str::to_string),
    }
    .normalized()?;
    Ok(ImportedRecord::Medication(medication))
}
