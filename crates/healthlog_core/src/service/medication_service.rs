//! Medication use-case service.
//!
//! # Responsibility
//! - Provide schedule CRUD and the taken flag to core callers.
//! - Feed stored schedules into the reminder evaluator and adherence.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Log lines carry ids and counts only.

use crate::dictionary::{DrugDictionary, InteractionEntry};
use crate::insight::adherence::{medication_adherence, Adherence};
use crate::model::medication::{Medication, MedicationId, NewMedication};
use crate::reminder::{due_reminders, DueReminder};
use crate::repo::error::RepoResult;
use crate::repo::medication_repo::{MedicationListQuery, MedicationRepository};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;

/// Use-case service wrapper for medication schedules.
pub struct MedicationService<R: MedicationRepository> {
    repo: R,
}

impl<R: MedicationRepository> MedicationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_medication(&self, medication: &NewMedication) -> RepoResult<MedicationId> {
        let id = self.repo.create_medication(medication)?;
        info!(
            "event=medication_add module=service status=ok id={} frequency={}",
            id, medication.frequency
        );
        Ok(id)
    }

    pub fn get_medication(&self, id: MedicationId) -> RepoResult<Option<Medication>> {
        self.repo.get_medication(id)
    }

    pub fn list_medications(&self, query: &MedicationListQuery) -> RepoResult<Vec<Medication>> {
        self.repo.list_medications(query)
    }

    /// Marks the dose for `day` as taken.
    ///
    /// Returns `RepoError::NotFound` for an unknown id.
    pub fn mark_taken(&self, id: MedicationId, day: NaiveDate) -> RepoResult<()> {
        self.repo.mark_taken(id, day)?;
        info!("event=medication_taken module=service status=ok id={id} day={day}");
        Ok(())
    }

    pub fn clear_taken(&self, person: Option<&str>) -> RepoResult<usize> {
        let cleared = self.repo.clear_taken(person)?;
        info!("event=medication_clear_taken module=service status=ok cleared={cleared}");
        Ok(cleared)
    }

    pub fn remove_medication(&self, id: MedicationId) -> RepoResult<()> {
        self.repo.remove_medication(id)?;
        info!("event=medication_remove module=service status=ok id={id}");
        Ok(())
    }

    /// Deletes every schedule for every person.
    pub fn reset_medications(&self) -> RepoResult<usize> {
        let deleted = self.repo.reset_medications()?;
        info!("event=medication_reset module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    /// Loads schedules and evaluates which doses are due at `now`.
    pub fn due_reminders(
        &self,
        query: &MedicationListQuery,
        now: NaiveDateTime,
        tolerance_minutes: u32,
    ) -> RepoResult<Vec<DueReminder>> {
        let medications = self.repo.list_medications(query)?;
        let due = due_reminders(&medications, now, tolerance_minutes);
        info!(
            "event=reminder_eval module=service status=ok candidates={} due={} tolerance_min={}",
            medications.len(),
            due.len(),
            tolerance_minutes
        );
        Ok(due)
    }

    pub fn adherence(&self, query: &MedicationListQuery, day: NaiveDate) -> RepoResult<Adherence> {
        let medications = self.repo.list_medications(query)?;
        Ok(medication_adherence(&medications, day))
    }

    /// Screens every pair of stored medication names against `dictionary`.
    pub fn interaction_warnings<'d>(
        &self,
        query: &MedicationListQuery,
        dictionary: &'d DrugDictionary,
    ) -> RepoResult<Vec<&'d InteractionEntry>> {
        let names = self
            .repo
            .list_medications(query)?
            .into_iter()
            .map(|medication| medication.name)
            .collect::<Vec<_>>();
        Ok(dictionary.check_all(&names))
    }
}
