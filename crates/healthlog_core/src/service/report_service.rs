//! Loads one person's records and assembles the report model.

use crate::insight::report::{build_report, HealthReport, ReportInputs};
use crate::repo::error::RepoResult;
use crate::repo::goal_repo::{GoalRepository, SqliteGoalRepository};
use crate::repo::medication_repo::{
    MedicationListQuery, MedicationRepository, SqliteMedicationRepository,
};
use crate::repo::metric_repo::{MetricListQuery, MetricRepository, SqliteMetricRepository};
use chrono::NaiveDateTime;
use log::info;
use rusqlite::Connection;

pub struct ReportService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ReportService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn build_report(&self, person: &str, now: NaiveDateTime) -> RepoResult<HealthReport> {
        let person = person.trim();
        let metrics = SqliteMetricRepository::try_new(self.conn)?
            .list_metrics(&MetricListQuery::for_person(person))?;
        let medications = SqliteMedicationRepository::try_new(self.conn)?.list_medications(
            &MedicationListQuery {
                person: Some(person.to_string()),
            },
        )?;
        let active_goals = SqliteGoalRepository::try_new(self.conn)?.list_active_goals()?;

        let report = build_report(ReportInputs {
            person,
            metrics: &metrics,
            medications: &medications,
            active_goals: &active_goals,
            now,
        });
        info!(
            "event=report_build module=service status=ok metrics={} medications={} insights={}",
            metrics.len(),
            medications.len(),
            report.insights.len()
        );
        Ok(report)
    }
}
