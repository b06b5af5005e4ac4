//! Metric use-case service.

use crate::insight::summary::{summarize, weekly_totals, MetricSummary, SummaryWindow, WeeklyTotal};
use crate::model::metric::{Metric, MetricId, MetricType, NewMetric};
use crate::repo::error::RepoResult;
use crate::repo::metric_repo::{MetricListQuery, MetricRepository};
use chrono::NaiveDateTime;
use log::info;

/// Use-case service wrapper for the metric log.
pub struct MetricService<R: MetricRepository> {
    repo: R,
}

impl<R: MetricRepository> MetricService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one observation.
    pub fn log_metric(&self, metric: &NewMetric) -> RepoResult<MetricId> {
        let id = self.repo.create_metric(metric)?;
        info!(
            "event=metric_log module=service status=ok id={} metric_type={} source={}",
            id,
            metric.metric_type,
            metric.source.as_str()
        );
        Ok(id)
    }

    pub fn list_metrics(&self, query: &MetricListQuery) -> RepoResult<Vec<Metric>> {
        self.repo.list_metrics(query)
    }

    /// Summarizes metrics matching `query` over `window`.
    ///
    /// For `Last7Days` the store query is narrowed to the window before
    /// aggregation.
    pub fn summarize(
        &self,
        query: &MetricListQuery,
        window: SummaryWindow,
        now: NaiveDateTime,
    ) -> RepoResult<MetricSummary> {
        let mut query = query.clone();
        if let Some(start) = window.start(now) {
            query.from = Some(query.from.map_or(start, |from| from.max(start)));
        }
        let metrics = self.repo.list_metrics(&query)?;
        Ok(summarize(&metrics, window, now))
    }

    pub fn weekly_totals(
        &self,
        query: &MetricListQuery,
        metric_type: &MetricType,
    ) -> RepoResult<Vec<WeeklyTotal>> {
        let query = MetricListQuery {
            metric_type: Some(metric_type.clone()),
            ..query.clone()
        };
        let metrics = self.repo.list_metrics(&query)?;
        Ok(weekly_totals(&metrics, metric_type))
    }
}
