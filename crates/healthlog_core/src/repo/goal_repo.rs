//! Goal repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store goals and resolve the active goal for a `(metric_type, period)`.
//!
//! # Invariants
//! - Creating a goal supersedes the previous active goal for the same pair
//!   inside one immediate transaction.
//! - A partial unique index backs the one-active-goal rule.

use crate::model::goal::{validate_target, Goal, GoalId, GoalPeriod};
use crate::model::metric::MetricType;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::readiness::{ensure_connection_ready, parse_stored_uuid};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    metric_type,
    period,
    target,
    created_at,
    superseded_at
FROM goals";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "metric_type",
    "period",
    "target",
    "created_at",
    "superseded_at",
];

/// Repository interface for goals.
pub trait GoalRepository {
    /// Stores a new active goal, superseding the previous one for the pair.
    fn create_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
        target: f64,
    ) -> RepoResult<GoalId>;
    fn get_active_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
    ) -> RepoResult<Option<Goal>>;
    /// Active goals ordered by metric type then period.
    fn list_active_goals(&self) -> RepoResult<Vec<Goal>>;
    /// All goals for the pair, newest first.
    fn list_goal_history(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
    ) -> RepoResult<Vec<Goal>>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "goals", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
        target: f64,
    ) -> RepoResult<GoalId> {
        let target = validate_target(target)?;
        let id = Uuid::new_v4();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE goals
             SET superseded_at = (strftime('%s', 'now') * 1000)
             WHERE metric_type = ?1
               AND period = ?2
               AND superseded_at IS NULL;",
            params![metric_type.as_str(), period.as_str()],
        )?;
        tx.execute(
            "INSERT INTO goals (id, metric_type, period, target)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                metric_type.as_str(),
                period.as_str(),
                target
            ],
        )?;
        tx.commit()?;

        Ok(id)
    }

    fn get_active_goal(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
    ) -> RepoResult<Option<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE metric_type = ?1
               AND period = ?2
               AND superseded_at IS NULL;"
        ))?;
        let mut rows = stmt.query(params![metric_type.as_str(), period.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_active_goals(&self) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE superseded_at IS NULL
             ORDER BY metric_type ASC, period ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn list_goal_history(
        &self,
        metric_type: &MetricType,
        period: GoalPeriod,
    ) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE metric_type = ?1
               AND period = ?2
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query(params![metric_type.as_str(), period.as_str()])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("id")?;
    let id = parse_stored_uuid("goals", &id_text)?;

    let type_text: String = row.get("metric_type")?;
    let metric_type = type_text.parse::<MetricType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid metric type `{type_text}` in goals.metric_type"
        ))
    })?;

    let period_text: String = row.get("period")?;
    let period = period_text.parse::<GoalPeriod>().map_err(|_| {
        RepoError::InvalidData(format!("invalid period `{period_text}` in goals.period"))
    })?;

    let target: f64 = row.get("target")?;
    let target = validate_target(target).map_err(|_| {
        RepoError::InvalidData(format!("invalid target `{target}` in goals.target"))
    })?;

    Ok(Goal {
        id,
        metric_type,
        period,
        target,
        created_at: row.get("created_at")?,
        superseded_at: row.get("superseded_at")?,
    })
}
