//! Rule-based health observations.
//!
//! Core returns typed observations only; wording belongs to the caller.
//!
//! # Rules
//! - Steps: average under 80% of `weekly_target / 7` is below target.
//! - Calories: average over 110% of the daily target is above target.
//! - Adherence: under 80% is low; nothing scheduled is reported as such.
//! - No metrics in the recent window replaces both metric rules.

use crate::insight::adherence::Adherence;
use crate::insight::summary::MetricSummary;
use crate::model::metric::MetricType;
use serde::Serialize;

const STEPS_SHORTFALL_RATIO: f64 = 0.8;
const CALORIES_EXCESS_RATIO: f64 = 1.1;
const ADHERENCE_LOW_PERCENT: f64 = 80.0;

/// One typed observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    StepsBelowTarget { average: f64, daily_target: f64 },
    StepsOnTrack { average: f64, daily_target: f64 },
    CaloriesAboveTarget { average: f64, daily_target: f64 },
    CaloriesWithinTarget { average: f64, daily_target: f64 },
    NotEnoughData,
    NoMedicationSchedule,
    LowAdherence { percent: f64 },
    GoodAdherence { percent: f64 },
}

/// Inputs for [`derive_insights`].
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    /// Summary over the recent window (normally last 7 days).
    pub recent: &'a MetricSummary,
    pub weekly_steps_target: f64,
    pub daily_calories_target: f64,
    pub adherence: &'a Adherence,
}

/// Applies the observation rules in a fixed order: metrics, then adherence.
pub fn derive_insights(inputs: InsightInputs<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    if inputs.recent.count == 0 {
        insights.push(Insight::NotEnoughData);
    } else {
        let steps_average = inputs.recent.average_for(&MetricType::Steps).unwrap_or(0.0);
        let steps_daily_target = inputs.weekly_steps_target / 7.0;
        if steps_average < steps_daily_target * STEPS_SHORTFALL_RATIO {
            insights.push(Insight::StepsBelowTarget {
                average: steps_average,
                daily_target: steps_daily_target,
            });
        } else {
            insights.push(Insight::StepsOnTrack {
                average: steps_average,
                daily_target: steps_daily_target,
            });
        }

        let calories_average = inputs
            .recent
            .average_for(&MetricType::Calories)
            .unwrap_or(0.0);
        if calories_average > inputs.daily_calories_target * CALORIES_EXCESS_RATIO {
            insights.push(Insight::CaloriesAboveTarget {
                average: calories_average,
                daily_target: inputs.daily_calories_target,
            });
        } else {
            insights.push(Insight::CaloriesWithinTarget {
                average: calories_average,
                daily_target: inputs.daily_calories_target,
            });
        }
    }

    let adherence = inputs.adherence;
    if adherence.scheduled == 0 {
        insights.push(Insight::NoMedicationSchedule);
    } else if adherence.percent < ADHERENCE_LOW_PERCENT {
        insights.push(Insight::LowAdherence {
            percent: adherence.percent,
        });
    } else {
        insights.push(Insight::GoodAdherence {
            percent: adherence.percent,
        });
    }

    insights
}
