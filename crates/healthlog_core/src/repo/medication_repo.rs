//! Medication repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist medication schedules and their day-scoped taken flag.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Write paths normalize input through `NewMedication::normalized()`.
//! - Listing order is `time_of_day ASC, created_at ASC, insertion order`.
//! - Read paths reject undecodable rows with `RepoError::InvalidData`.

use crate::model::datetime::{format_date, format_time, DATE_FORMAT, TIME_FORMAT};
use crate::model::medication::{Frequency, Medication, MedicationId, NewMedication};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::readiness::{ensure_connection_ready, parse_stored_uuid};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const ENTITY: &str = "medication";

const MEDICATION_SELECT_SQL: &str = "SELECT
    id,
    person,
    name,
    dosage,
    time_of_day,
    frequency,
    start_date,
    caregiver_email,
    taken_on,
    created_at
FROM medications";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "person",
    "name",
    "dosage",
    "time_of_day",
    "frequency",
    "start_date",
    "caregiver_email",
    "taken_on",
    "created_at",
];

/// Filter options for listing medications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationListQuery {
    /// Exact profile label match.
    pub person: Option<String>,
}

/// Repository interface for medication schedules.
pub trait MedicationRepository {
    /// Inserts one schedule and returns its freshly assigned id.
    fn create_medication(&self, medication: &NewMedication) -> RepoResult<MedicationId>;
    fn get_medication(&self, id: MedicationId) -> RepoResult<Option<Medication>>;
    fn list_medications(&self, query: &MedicationListQuery) -> RepoResult<Vec<Medication>>;
    /// Records that the dose for `day` was taken.
    fn mark_taken(&self, id: MedicationId, day: NaiveDate) -> RepoResult<()>;
    /// Clears taken flags, optionally for one person. Returns rows changed.
    fn clear_taken(&self, person: Option<&str>) -> RepoResult<usize>;
    fn remove_medication(&self, id: MedicationId) -> RepoResult<()>;
    /// Deletes every medication. Returns rows deleted.
    fn reset_medications(&self) -> RepoResult<usize>;
}

/// SQLite-backed medication repository.
pub struct SqliteMedicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMedicationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "medications", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MedicationRepository for SqliteMedicationRepository<'_> {
    fn create_medication(&self, medication: &NewMedication) -> RepoResult<MedicationId> {
        let medication = medication.normalized()?;
        let id = Uuid::new_v4();

        self.conn.execute(
            "INSERT INTO medications (
                id,
                person,
                name,
                dosage,
                time_of_day,
                frequency,
                start_date,
                caregiver_email
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, date('now', 'localtime')), ?8);",
            params![
                id.to_string(),
                medication.person.as_str(),
                medication.name.as_str(),
                medication.dosage.as_str(),
                format_time(medication.time_of_day),
                medication.frequency.as_str(),
                medication.start_date.map(format_date),
                medication.caregiver_email.as_deref(),
            ],
        )?;

        Ok(id)
    }

    fn get_medication(&self, id: MedicationId) -> RepoResult<Option<Medication>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEDICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_medication_row(row)?));
        }
        Ok(None)
    }

    fn list_medications(&self, query: &MedicationListQuery) -> RepoResult<Vec<Medication>> {
        let mut sql = format!("{MEDICATION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(person) = query.person.as_ref() {
            sql.push_str(" AND person = ?");
            bind_values.push(Value::Text(person.trim().to_string()));
        }
        sql.push_str(" ORDER BY time_of_day ASC, created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut medications = Vec::new();
        while let Some(row) = rows.next()? {
            medications.push(parse_medication_row(row)?);
        }
        Ok(medications)
    }

    fn mark_taken(&self, id: MedicationId, day: NaiveDate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE medications SET taken_on = ?2 WHERE id = ?1;",
            params![id.to_string(), format_date(day)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn clear_taken(&self, person: Option<&str>) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE medications
             SET taken_on = NULL
             WHERE taken_on IS NOT NULL
               AND (?1 IS NULL OR person = ?1);",
            [person.map(str::trim)],
        )?;
        Ok(changed)
    }

    fn remove_medication(&self, id: MedicationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    fn reset_medications(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM medications;", [])?;
        Ok(deleted)
    }
}

fn parse_medication_row(row: &Row<'_>) -> RepoResult<Medication> {
    let id_text: String = row.get("id")?;
    let id = parse_stored_uuid("medications", &id_text)?;

    let time_text: String = row.get("time_of_day")?;
    let time_of_day = NaiveTime::parse_from_str(&time_text, TIME_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid time `{time_text}` in medications.time_of_day"
        ))
    })?;

    let frequency_text: String = row.get("frequency")?;
    let frequency = frequency_text.parse::<Frequency>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid frequency `{frequency_text}` in medications.frequency"
        ))
    })?;

    let start_text: String = row.get("start_date")?;
    let start_date = parse_stored_date("start_date", &start_text)?;

    let taken_on = match row.get::<_, Option<String>>("taken_on")? {
        Some(value) => Some(parse_stored_date("taken_on", &value)?),
        None => None,
    };

    Ok(Medication {
        id,
        person: row.get("person")?,
        name: row.get("name")?,
        dosage: row.get("dosage")?,
        time_of_day,
        frequency,
        start_date,
        caregiver_email: row.get("caregiver_email")?,
        taken_on,
        created_at: row.get("created_at")?,
    })
}

fn parse_stored_date(column: &str, value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in medications.{column}"))
    })
}
