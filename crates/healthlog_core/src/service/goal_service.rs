//! Goal use-case service.
//!
//! # Invariants
//! - At most one active goal per (metric type, period); setting a goal
//!   supersedes the previous one in the same transaction.
//! - Progress only reads metrics inside the current period.

use crate::insight::goal_progress::{goal_progress, period_bounds, GoalProgress};
use crate::model::goal::{Goal, GoalId, GoalPeriod};
use crate::model::metric::MetricType;
use crate::repo::error::RepoResult;
use crate::repo::goal_repo::GoalRepository;
use crate::repo::metric_repo::{MetricListQuery, MetricRepository};
use chrono::NaiveDateTime;
use log::info;

pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores `target` as the active goal for the pair.
    pub fn set_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
        target: f64,
    ) -> RepoResult<GoalId> {
        let id = self.repo.create_goal(metric_type, period, target)?;
        info!(
            "event=goal_set module=service status=ok id={} metric_type={} period={}",
            id, metric_type, period
        );
        Ok(id)
    }

    pub fn active_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
    ) -> RepoResult<Option<Goal>> {
        self.repo.get_active_goal(metric_type, period)
    }

    pub fn list_active_goals(&self) -> RepoResult<Vec<Goal>> {
        self.repo.list_active_goals()
    }

    pub fn goal_history(&self, metric_type: &MetricType, period: GoalPeriod) -> RepoResult<Vec<Goal>> {
        self.repo.list_goal_history(metric_type, period)
    }

    /// Progress of the active goal for the pair, or `None` without one.
    ///
    /// `person` narrows the metrics counted; goals themselves are shared.
    pub fn progress<M: MetricRepository>(
        &self,
        metrics: &M,
        metric_type: &MetricType,
        period: GoalPeriod,
        person: Option<&str>,
        now: NaiveDateTime,
    ) -> RepoResult<Option<GoalProgress>> {
        let Some(goal) = self.repo.get_active_goal(metric_type, period)? else {
            return Ok(None);
        };
        let (period_start, period_end) = period_bounds(period, now);
        let in_period = metrics.list_metrics(&MetricListQuery {
            metric_type: Some(metric_type.clone()),
            person: person.map(str::to_string),
            from: Some(period_start),
            to: Some(period_end),
            ..MetricListQuery::default()
        })?;
        Ok(Some(goal_progress(&in_period, &goal, now)))
    }
}
