//! Metric repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append metric observations and read them back in time order.
//!
//! # Invariants
//! - Metrics are append-only; this repository exposes no update path.
//! - List results are ordered by `recorded_at ASC`, then insertion order.
//! - Time filters use `from` inclusive and `to` exclusive bounds.

use crate::model::datetime::{format_timestamp, DATETIME_FORMAT};
use crate::model::metric::{Metric, MetricId, MetricSource, MetricType, NewMetric};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::readiness::{ensure_connection_ready, parse_stored_uuid};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const METRIC_SELECT_SQL: &str = "SELECT
    id,
    person,
    metric_type,
    value,
    recorded_at,
    source
FROM metrics";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "person",
    "metric_type",
    "value",
    "recorded_at",
    "source",
];

/// Filter options for listing metrics. All filters are conjunctive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricListQuery {
    pub metric_type: Option<MetricType>,
    pub person: Option<String>,
    pub source: Option<MetricSource>,
    /// Inclusive lower bound on `recorded_at`.
    pub from: Option<NaiveDateTime>,
    /// Exclusive upper bound on `recorded_at`.
    pub to: Option<NaiveDateTime>,
}

impl MetricListQuery {
    /// Restricts the query to one profile label.
    pub fn for_person(person: impl Into<String>) -> Self {
        Self {
            person: Some(person.into()),
            ..Self::default()
        }
    }
}

/// Repository interface for the metric log.
pub trait MetricRepository {
    /// Appends one observation and returns its freshly assigned id.
    fn create_metric(&self, metric: &NewMetric) -> RepoResult<MetricId>;
    fn list_metrics(&self, query: &MetricListQuery) -> RepoResult<Vec<Metric>>;
}

/// SQLite-backed metric repository.
pub struct SqliteMetricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetricRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "metrics", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MetricRepository for SqliteMetricRepository<'_> {
    fn create_metric(&self, metric: &NewMetric) -> RepoResult<MetricId> {
        let metric = metric.normalized()?;
        let id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO metrics (
                id,
                person,
                metric_type,
                value,
                recorded_at,
                source
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                metric.person.as_str(),
                metric.metric_type.as_str(),
                metric.value,
                format_timestamp(metric.recorded_at),
                metric.source.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn list_metrics(&self, query: &MetricListQuery) -> RepoResult<Vec<Metric>> {
        let mut sql = format!("{METRIC_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(metric_type) = query.metric_type.as_ref() {
            sql.push_str(" AND metric_type = ?");
            bind_values.push(Value::Text(metric_type.as_str().to_string()));
        }
        if let Some(person) = query.person.as_ref() {
            sql.push_str(" AND person = ?");
            bind_values.push(Value::Text(person.trim().to_string()));
        }
        if let Some(source) = query.source {
            sql.push_str(" AND source = ?");
            bind_values.push(Value::Text(source.as_str().to_string()));
        }
        if let Some(from) = query.from {
            sql.push_str(" AND recorded_at >= ?");
            bind_values.push(Value::Text(format_timestamp(from)));
        }
        if let Some(to) = query.to {
            sql.push_str(" AND recorded_at < ?");
            bind_values.push(Value::Text(format_timestamp(to)));
        }
        sql.push_str(" ORDER BY recorded_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut metrics = Vec::new();
        while let Some(row) = rows.next()? {
            metrics.push(parse_metric_row(row)?);
        }
        Ok(metrics)
    }
}

fn parse_metric_row(row: &Row<'_>) -> RepoResult<Metric> {
    let id_text: String = row.get("id")?;
    let id = parse_stored_uuid("metrics", &id_text)?;

    let type_text: String = row.get("metric_type")?;
    let metric_type = type_text.parse::<MetricType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid metric type `{type_text}` in metrics.metric_type"
        ))
    })?;

    let recorded_text: String = row.get("recorded_at")?;
    let recorded_at =
        NaiveDateTime::parse_from_str(&recorded_text, DATETIME_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{recorded_text}` in metrics.recorded_at"
            ))
        })?;

    let source_text: String = row.get("source")?;
    let source = source_text.parse::<MetricSource>().map_err(|_| {
        RepoError::InvalidData(format!("invalid source `{source_text}` in metrics.source"))
    })?;

    let value: f64 = row.get("value")?;
    if !value.is_finite() || value < 0.0 {
        return Err(RepoError::InvalidData(format!(
            "invalid value `{value}` in metrics.value"
        )));
    }

    Ok(Metric {
        id,
        person: row.get("person")?,
        metric_type,
        value,
        recorded_at,
        source,
    })
}
