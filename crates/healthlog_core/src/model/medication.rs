//! Medication schedule model.
//!
//! # Responsibility
//! - Define the persisted medication record and its insert request shape.
//! - Decide on which calendar days a schedule produces a dose.
//!
//! # Invariants
//! - `name`, `dosage` and `person` are non-empty after trimming.
//! - `time_of_day` is minute precision.
//! - The taken flag is day-scoped (`taken_on`), so it resets at day rollover.

use crate::model::datetime::truncate_to_minute;
use crate::model::validation::{require_text, ValidationError};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned medication identifier.
pub type MedicationId = Uuid;

/// Profile label applied when the caller does not name a person.
pub const DEFAULT_PERSON: &str = "Self";

/// Dose recurrence for a medication schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// One dose every day at `time_of_day`.
    Daily,
    /// One dose per week, on the weekday of `start_date`.
    Weekly,
    /// Taken on demand; never produces a reminder.
    AsNeeded,
}

impl Frequency {
    /// Stable storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::AsNeeded => "as_needed",
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "as_needed" | "prn" => Ok(Self::AsNeeded),
            _ => Err(ValidationError::UnknownVariant {
                field: "frequency",
                value: value.trim().to_string(),
            }),
        }
    }
}

/// Insert request for a medication schedule.
///
/// `start_date = None` lets the store use the creation day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedication {
    pub person: String,
    pub name: String,
    pub dosage: String,
    pub time_of_day: NaiveTime,
    pub frequency: Frequency,
    pub start_date: Option<NaiveDate>,
    pub caregiver_email: Option<String>,
}

impl NewMedication {
    /// Creates a daily schedule for the default person.
    pub fn new(name: impl Into<String>, dosage: impl Into<String>, time_of_day: NaiveTime) -> Self {
        Self {
            person: DEFAULT_PERSON.to_string(),
            name: name.into(),
            dosage: dosage.into(),
            time_of_day,
            frequency: Frequency::Daily,
            start_date: None,
            caregiver_email: None,
        }
    }

    /// Sets the recurrence.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the profile label.
    pub fn for_person(mut self, person: impl Into<String>) -> Self {
        self.person = person.into();
        self
    }

    /// Sets the first scheduled day.
    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Returns a trimmed copy, or the first violated rule.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let caregiver_email = match self.caregiver_email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if email.contains('@') && !email.contains(char::is_whitespace) => {
                Some(email.to_string())
            }
            Some(email) => {
                return Err(ValidationError::InvalidFormat {
                    field: "caregiver_email",
                    value: email.to_string(),
                    expected: "an email address",
                });
            }
        };

        Ok(Self {
            person: require_text("person", &self.person)?,
            name: require_text("name", &self.name)?,
            dosage: require_text("dosage", &self.dosage)?,
            time_of_day: truncate_to_minute(self.time_of_day),
            frequency: self.frequency,
            start_date: self.start_date,
            caregiver_email,
        })
    }
}

/// Persisted medication schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub person: String,
    pub name: String,
    pub dosage: String,
    pub time_of_day: NaiveTime,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub caregiver_email: Option<String>,
    /// Local day of the last `mark_taken`.
    pub taken_on: Option<NaiveDate>,
    /// Unix epoch milliseconds, set by the store.
    pub created_at: i64,
}

impl Medication {
    /// Returns whether the dose for `day` has been marked taken.
    pub fn is_taken_on(&self, day: NaiveDate) -> bool {
        self.taken_on == Some(day)
    }

    /// Returns whether this schedule produces a dose on `day`.
    pub fn is_scheduled_on(&self, day: NaiveDate) -> bool {
        if day < self.start_date {
            return false;
        }
        match self.frequency {
            Frequency::Daily => true,
            Frequency::Weekly => day.weekday() == self.start_date.weekday(),
            Frequency::AsNeeded => false,
        }
    }
}
