//! Health metric model.
//!
//! # Responsibility
//! - Define the append-only metric log record and its insert request.
//! - Own the metric type domain shared with goals.
//!
//! # Invariants
//! - `value` is finite and `>= 0`.
//! - Custom type names are lowercase slugs, so string equality is a safe
//!   soft key between metrics and goals.
//! - Metrics are never edited after insert.

use crate::model::datetime::truncate_to_second;
use crate::model::medication::DEFAULT_PERSON;
use crate::model::validation::{require_non_negative, require_text, ValidationError};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned metric identifier.
pub type MetricId = Uuid;

static CUSTOM_METRIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,31}$").expect("valid custom metric regex"));

/// Kind of measurement carried by a metric or targeted by a goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MetricType {
    Steps,
    Calories,
    /// User-defined measurement, e.g. `water_ml`.
    Custom(String),
}

impl MetricType {
    /// Stable storage/wire label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Steps => "steps",
            Self::Calories => "calories",
            Self::Custom(name) => name.as_str(),
        }
    }
}

impl Display for MetricType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "steps" => Ok(Self::Steps),
            "calories" => Ok(Self::Calories),
            other if CUSTOM_METRIC_RE.is_match(other) => Ok(Self::Custom(other.to_string())),
            _ => Err(ValidationError::UnknownVariant {
                field: "metric_type",
                value: value.trim().to_string(),
            }),
        }
    }
}

impl From<MetricType> for String {
    fn from(value: MetricType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for MetricType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Origin of a metric row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    Manual,
    Import,
}

impl MetricSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Import => "import",
        }
    }
}

impl FromStr for MetricSource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "import" => Ok(Self::Import),
            _ => Err(ValidationError::UnknownVariant {
                field: "source",
                value: value.trim().to_string(),
            }),
        }
    }
}

/// Insert request for one metric observation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMetric {
    pub person: String,
    pub metric_type: MetricType,
    pub value: f64,
    pub recorded_at: NaiveDateTime,
    pub source: MetricSource,
}

impl NewMetric {
    /// Creates a manually logged metric for the default person.
    pub fn manual(metric_type: MetricType, value: f64, recorded_at: NaiveDateTime) -> Self {
        Self {
            person: DEFAULT_PERSON.to_string(),
            metric_type,
            value,
            recorded_at,
            source: MetricSource::Manual,
        }
    }

    /// Sets the profile label.
    pub fn for_person(mut self, person: impl Into<String>) -> Self {
        self.person = person.into();
        self
    }

    /// Returns a trimmed copy, or the first violated rule.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            person: require_text("person", &self.person)?,
            metric_type: self.metric_type.clone(),
            value: require_non_negative("value", self.value)?,
            recorded_at: truncate_to_second(self.recorded_at),
            source: self.source,
        })
    }
}

/// Persisted metric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub person: String,
    pub metric_type: MetricType,
    pub value: f64,
    pub recorded_at: NaiveDateTime,
    pub source: MetricSource,
}
