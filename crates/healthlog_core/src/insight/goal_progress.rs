//! Goal progress over the current daily or weekly period.
//!
//! # Invariants
//! - Daily periods run local midnight to next midnight.
//! - Weekly periods are ISO weeks, Monday 00:00 to next Monday 00:00.
//! - `period_end` is exclusive.
//! - `percent` is never negative and never capped at 100.

use crate::model::goal::{Goal, GoalPeriod};
use crate::model::metric::{Metric, MetricType};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Progress snapshot for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub metric_type: MetricType,
    pub period: GoalPeriod,
    pub target: f64,
    pub actual: f64,
    pub percent: f64,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
}

impl GoalProgress {
    pub fn is_met(&self) -> bool {
        self.actual >= self.target
    }
}

/// Returns `[start, end)` of the period containing `now`.
pub fn period_bounds(period: GoalPeriod, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let today = now.date();
    let (start_day, length) = match period {
        GoalPeriod::Daily => (today, 1),
        GoalPeriod::Weekly => {
            let back = u64::from(today.weekday().num_days_from_monday());
            (
                today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN),
                7,
            )
        }
    };
    let end_day = start_day
        .checked_add_days(Days::new(length))
        .unwrap_or(NaiveDate::MAX);
    (
        start_day.and_time(NaiveTime::MIN),
        end_day.and_time(NaiveTime::MIN),
    )
}

/// Computes progress of `goal` from `metrics` for the period containing `now`.
pub fn goal_progress(metrics: &[Metric], goal: &Goal, now: NaiveDateTime) -> GoalProgress {
    target_progress(metrics, &goal.metric_type, goal.period, goal.target, now)
}

/// Computes progress against an explicit target (stored or default).
pub fn target_progress(
    metrics: &[Metric],
    metric_type: &MetricType,
    period: GoalPeriod,
    target: f64,
    now: NaiveDateTime,
) -> GoalProgress {
    let (period_start, period_end) = period_bounds(period, now);
    let actual = metrics
        .iter()
        .filter(|metric| &metric.metric_type == metric_type)
        .filter(|metric| period_start <= metric.recorded_at && metric.recorded_at < period_end)
        .map(|metric| metric.value)
        .sum::<f64>();

    let percent = if target > 0.0 {
        (actual * 100.0 / target).max(0.0)
    } else {
        0.0
    };

    GoalProgress {
        metric_type: metric_type.clone(),
        period,
        target,
        actual,
        percent,
        period_start,
        period_end,
    }
}

#[cfg(test)]
mod tests {
    use super::{goal_progress, period_bounds};
    use crate::model::goal::{Goal, GoalPeriod};
    use crate::model::metric::{Metric, MetricSource, MetricType};
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn steps(value: f64, recorded_at: NaiveDateTime) -> Metric {
        Metric {
            id: Uuid::new_v4(),
            person: "Self".to_string(),
            metric_type: MetricType::Steps,
            value,
            recorded_at,
            source: MetricSource::Manual,
        }
    }

    fn goal(period: GoalPeriod, target: f64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            metric_type: MetricType::Steps,
            period,
            target,
            created_at: 0,
            superseded_at: None,
        }
    }

    #[test]
    fn exceeding_target_reports_over_100_percent() {
        let now = at(2024, 3, 6, 20);
        let metrics = vec![steps(7_000.0, at(2024, 3, 6, 9)), steps(5_000.0, at(2024, 3, 6, 18))];
        let progress = goal_progress(&metrics, &goal(GoalPeriod::Daily, 10_000.0), now);
        assert_eq!(progress.actual, 12_000.0);
        assert_eq!(progress.percent, 120.0);
        assert!(progress.is_met());
    }

    #[test]
    fn weekly_period_is_monday_to_monday() {
        let (start, end) = period_bounds(GoalPeriod::Weekly, at(2024, 3, 6, 20));
        assert_eq!(start, at(2024, 3, 4, 0));
        assert_eq!(end, at(2024, 3, 11, 0));
    }

    #[test]
    fn weekly_progress_ignores_metrics_outside_week() {
        let now = at(2024, 3, 10, 23);
        let metrics = vec![
            steps(9_000.0, at(2024, 3, 3, 12)),
            steps(10_000.0, at(2024, 3, 4, 0)),
            steps(7_500.0, at(2024, 3, 10, 22)),
            steps(4_000.0, at(2024, 3, 11, 0)),
        ];
        let progress = goal_progress(&metrics, &goal(GoalPeriod::Weekly, 35_000.0), now);
        assert_eq!(progress.actual, 17_500.0);
        assert_eq!(progress.percent, 50.0);
    }

    #[test]
    fn no_metrics_gives_zero_percent() {
        let progress = goal_progress(&[], &goal(GoalPeriod::Daily, 10_000.0), at(2024, 3, 6, 8));
        assert_eq!(progress.actual, 0.0);
        assert_eq!(progress.percent, 0.0);
        assert!(!progress.is_met());
    }
}
