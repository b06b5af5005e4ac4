//! Structured report model consumed by document generators.
//!
//! # Invariants
//! - Assembly is pure; callers load records and pass them in.
//! - Weekly steps and daily calories always have a progress entry, using
//!   the stored goal when present and the default target otherwise.

use crate::insight::adherence::{medication_adherence, Adherence};
use crate::insight::advice::{derive_insights, Insight, InsightInputs};
use crate::insight::goal_progress::{target_progress, GoalProgress};
use crate::insight::summary::{summarize, MetricSummary, SummaryWindow};
use crate::model::goal::{default_target, Goal, GoalPeriod};
use crate::model::medication::Medication;
use crate::model::metric::{Metric, MetricType};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Number of most recent metrics carried in a report.
pub const REPORT_RECENT_METRICS: usize = 20;

const DEFAULT_TARGET_PAIRS: &[(MetricType, GoalPeriod)] = &[
    (MetricType::Steps, GoalPeriod::Weekly),
    (MetricType::Calories, GoalPeriod::Daily),
];

/// Everything a report renderer needs for one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub person: String,
    pub generated_at: NaiveDateTime,
    pub all_time: MetricSummary,
    pub last_7_days: MetricSummary,
    pub goal_progress: Vec<GoalProgress>,
    pub adherence: Adherence,
    /// Newest last, at most [`REPORT_RECENT_METRICS`] entries.
    pub recent_metrics: Vec<Metric>,
    pub insights: Vec<Insight>,
}

/// Records loaded for one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub person: &'a str,
    /// Metrics for `person`, ordered by `recorded_at` ascending.
    pub metrics: &'a [Metric],
    pub medications: &'a [Medication],
    pub active_goals: &'a [Goal],
    pub now: NaiveDateTime,
}

/// Builds the report model.
pub fn build_report(inputs: ReportInputs<'_>) -> HealthReport {
    let all_time = summarize(inputs.metrics, SummaryWindow::AllTime, inputs.now);
    let last_7_days = summarize(inputs.metrics, SummaryWindow::Last7Days, inputs.now);
    let adherence = medication_adherence(inputs.medications, inputs.now.date());

    let mut goal_progress = inputs
        .active_goals
        .iter()
        .map(|goal| {
            target_progress(
                inputs.metrics,
                &goal.metric_type,
                goal.period,
                goal.target,
                inputs.now,
            )
        })
        .collect::<Vec<_>>();
    for (metric_type, period) in DEFAULT_TARGET_PAIRS {
        let stored = inputs
            .active_goals
            .iter()
            .any(|goal| &goal.metric_type == metric_type && goal.period == *period);
        if stored {
            continue;
        }
        if let Some(target) = default_target(metric_type, *period) {
            goal_progress.push(target_progress(
                inputs.metrics,
                metric_type,
                *period,
                target,
                inputs.now,
            ));
        }
    }
    goal_progress.sort_by(|left, right| {
        left.metric_type
            .cmp(&right.metric_type)
            .then_with(|| left.period.cmp(&right.period))
    });

    let weekly_steps_target =
        resolve_target(inputs.active_goals, &MetricType::Steps, GoalPeriod::Weekly);
    let daily_calories_target =
        resolve_target(inputs.active_goals, &MetricType::Calories, GoalPeriod::Daily);
    let insights = derive_insights(InsightInputs {
        recent: &last_7_days,
        weekly_steps_target,
        daily_calories_target,
        adherence: &adherence,
    });

    let skip = inputs.metrics.len().saturating_sub(REPORT_RECENT_METRICS);
    let recent_metrics = inputs.metrics.iter().skip(skip).cloned().collect();

    HealthReport {
        person: inputs.person.to_string(),
        generated_at: inputs.now,
        all_time,
        last_7_days,
        goal_progress,
        adherence,
        recent_metrics,
        insights,
    }
}

fn resolve_target(goals: &[Goal], metric_type: &MetricType, period: GoalPeriod) -> f64 {
    goals
        .iter()
        .find(|goal| &goal.metric_type == metric_type && goal.period == period)
        .map(|goal| goal.target)
        .or_else(|| default_target(metric_type, period))
        .unwrap_or(0.0)
}
