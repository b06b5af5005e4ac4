//! Goal model.
//!
//! # Invariants
//! - `target` is finite and `> 0`.
//! - At most one goal per `(metric_type, period)` has `superseded_at = None`.

use crate::model::metric::MetricType;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned goal identifier.
pub type GoalId = Uuid;

const DEFAULT_WEEKLY_STEPS_TARGET: f64 = 35_000.0;
const DEFAULT_DAILY_CALORIES_TARGET: f64 = 2_200.0;

/// Recurrence window a goal target is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
}

impl GoalPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl Display for GoalPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalPeriod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(ValidationError::UnknownVariant {
                field: "period",
                value: value.trim().to_string(),
            }),
        }
    }
}

/// Persisted goal. Superseded goals are retained as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub metric_type: MetricType,
    pub period: GoalPeriod,
    pub target: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; `None` while active.
    pub superseded_at: Option<i64>,
}

impl Goal {
    pub fn is_active(&self) -> bool {
        self.superseded_at.is_none()
    }
}

/// Rejects non-finite and non-positive targets.
pub fn validate_target(target: f64) -> Result<f64, ValidationError> {
    if !target.is_finite() {
        return Err(ValidationError::NonFiniteValue("target"));
    }
    if target <= 0.0 {
        return Err(ValidationError::NonPositiveTarget(target));
    }
    Ok(target)
}

/// Fallback target used by reports when no goal has been stored.
pub fn default_target(metric_type: &MetricType, period: GoalPeriod) -> Option<f64> {
    match (metric_type, period) {
        (MetricType::Steps, GoalPeriod::Weekly) => Some(DEFAULT_WEEKLY_STEPS_TARGET),
        (MetricType::Calories, GoalPeriod::Daily) => Some(DEFAULT_DAILY_CALORIES_TARGET),
        _ => None,
    }
}
