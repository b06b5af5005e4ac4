//! Profile label queries spanning medications and metrics.

use crate::model::medication::DEFAULT_PERSON;
use crate::repo::error::RepoResult;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Returns distinct profile labels, sorted, always including `Self`.
pub fn list_people(conn: &Connection) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT person FROM medications
         UNION
         SELECT person FROM metrics;",
    )?;
    let mut rows = stmt.query([])?;
    let mut people = BTreeSet::from([DEFAULT_PERSON.to_string()]);
    while let Some(row) = rows.next()? {
        let person: String = row.get(0)?;
        people.insert(person);
    }
    Ok(people.into_iter().collect())
}
