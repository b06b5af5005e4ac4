//! Windowed metric summaries and weekly rollups.
//!
//! # Invariants
//! - Empty input yields `count = 0`, no range and empty maps, never an error.
//! - A type appears in `average_per_type` only when it has at least one
//!   record in the window.

use crate::model::metric::{Metric, MetricType};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregation window for [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryWindow {
    /// From local midnight six days before `now` through `now`.
    Last7Days,
    AllTime,
}

impl SummaryWindow {
    /// Inclusive lower bound, or `None` for an unbounded window.
    pub fn start(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Self::Last7Days => Some(
                now.date()
                    .checked_sub_days(Days::new(6))
                    .unwrap_or(NaiveDate::MIN)
                    .and_time(NaiveTime::MIN),
            ),
            Self::AllTime => None,
        }
    }

    pub fn contains(self, recorded_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self.start(now) {
            Some(start) => start <= recorded_at && recorded_at <= now,
            None => true,
        }
    }
}

/// Aggregate statistics over one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    /// Earliest `recorded_at` in the window.
    pub date_range_start: Option<NaiveDateTime>,
    /// Latest `recorded_at` in the window.
    pub date_range_end: Option<NaiveDateTime>,
    pub average_per_type: BTreeMap<MetricType, f64>,
    pub total_per_type: BTreeMap<MetricType, f64>,
}

impl MetricSummary {
    /// Arithmetic mean for `metric_type`; `None` when no record is in window.
    pub fn average_for(&self, metric_type: &MetricType) -> Option<f64> {
        self.average_per_type.get(metric_type).copied()
    }

    /// Sum for `metric_type`; zero when no record is in window.
    pub fn total_for(&self, metric_type: &MetricType) -> f64 {
        self.total_per_type.get(metric_type).copied().unwrap_or(0.0)
    }
}

/// Summarizes `metrics` that fall inside `window` relative to `now`.
pub fn summarize(metrics: &[Metric], window: SummaryWindow, now: NaiveDateTime) -> MetricSummary {
    let mut summary = MetricSummary::default();
    let mut counts: BTreeMap<MetricType, usize> = BTreeMap::new();

    for metric in metrics
        .iter()
        .filter(|metric| window.contains(metric.recorded_at, now))
    {
        summary.count += 1;
        summary.date_range_start = Some(match summary.date_range_start {
            Some(current) => current.min(metric.recorded_at),
            None => metric.recorded_at,
        });
        summary.date_range_end = Some(match summary.date_range_end {
            Some(current) => current.max(metric.recorded_at),
            None => metric.recorded_at,
        });
        *summary
            .total_per_type
            .entry(metric.metric_type.clone())
            .or_insert(0.0) += metric.value;
        *counts.entry(metric.metric_type.clone()).or_insert(0) += 1;
    }

    summary.average_per_type = counts
        .into_iter()
        .map(|(metric_type, count)| {
            let total = summary.total_per_type.get(&metric_type).copied().unwrap_or(0.0);
            (metric_type, total / count as f64)
        })
        .collect();
    summary
}

/// Total for one metric type within one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTotal {
    pub iso_year: i32,
    pub iso_week: u32,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub count: usize,
    pub total: f64,
}

/// Groups `metrics` of `metric_type` by ISO week, oldest week first.
pub fn weekly_totals(metrics: &[Metric], metric_type: &MetricType) -> Vec<WeeklyTotal> {
    let mut weeks: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();
    for metric in metrics
        .iter()
        .filter(|metric| &metric.metric_type == metric_type)
    {
        let iso = metric.recorded_at.date().iso_week();
        let entry = weeks.entry((iso.year(), iso.week())).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += metric.value;
    }

    weeks
        .into_iter()
        .filter_map(|((iso_year, iso_week), (count, total))| {
            let week_start = NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon)?;
            Some(WeeklyTotal {
                iso_year,
                iso_week,
                week_start,
                count,
                total,
            })
        })
        .collect()
}
