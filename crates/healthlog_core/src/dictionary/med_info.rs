//! Medication reference sheet keyed by drug name.

use super::{normalize_key, read_table_file, DictionaryError, DictionaryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const LIST_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationInfoEntry {
    pub name: String,
    pub uses: Vec<String>,
    pub side_effects: Vec<String>,
    pub precautions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MedInfoRow {
    #[serde(alias = "name", alias = "drug")]
    drug_name: String,
    #[serde(default)]
    uses: String,
    #[serde(default)]
    side_effects: String,
    #[serde(default)]
    precautions: String,
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MedInfoTable {
    entries: HashMap<String, MedicationInfoEntry>,
}

impl MedInfoTable {
    /// Parses a CSV table with a `drug_name,uses,side_effects,precautions`
    /// header. List cells are `;`-separated.
    pub fn from_csv_str(data: &str) -> DictionaryResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let headers = reader.headers()?.clone();

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);
            let row: MedInfoRow = record.deserialize(Some(&headers))?;
            if row.drug_name.is_empty() {
                return Err(DictionaryError::InvalidEntry {
                    line,
                    reason: "drug name must not be blank".to_string(),
                });
            }
            let key = normalize_key(&row.drug_name);
            if entries.contains_key(&key) {
                return Err(DictionaryError::DuplicateEntry { line, key });
            }
            entries.insert(
                key,
                MedicationInfoEntry {
                    uses: split_list(&row.uses),
                    side_effects: split_list(&row.side_effects),
                    precautions: split_list(&row.precautions),
                    name: row.drug_name,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn from_path(path: &Path) -> DictionaryResult<Self> {
        Self::from_csv_str(&read_table_file(path)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&MedicationInfoEntry> {
        self.entries.get(&normalize_key(name))
    }

    /// All known names in original casing, sorted case-insensitively.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self
            .entries
            .values()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::MedInfoTable;
    use crate::dictionary::DictionaryError;

    #[test]
    fn lookup_is_case_insensitive_and_splits_lists() {
        let table = MedInfoTable::from_csv_str(
            "drug_name,uses,side_effects,precautions\n\
             Metformin,Type 2 diabetes,Nausea; Diarrhea ;,Check kidney function\n",
        )
        .unwrap();
        let entry = table.lookup("  METFORMIN ").unwrap();
        assert_eq!(entry.name, "Metformin");
        assert_eq!(entry.uses, vec!["Type 2 diabetes"]);
        assert_eq!(entry.side_effects, vec!["Nausea", "Diarrhea"]);
        assert!(table.lookup("metform").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = MedInfoTable::from_csv_str(
            "drug_name,uses,side_effects,precautions\nAspirin,a,b,c\naspirin,d,e,f\n",
        )
        .unwrap_err();
        assert!(matches!(err, DictionaryError::DuplicateEntry { line: 3, .. }));
    }

    #[test]
    fn names_are_sorted() {
        let table = MedInfoTable::from_csv_str(
            "drug_name,uses,side_effects,precautions\nbeta,,,\nAlpha,,,\n",
        )
        .unwrap();
        assert_eq!(table.names(), vec!["Alpha", "beta"]);
    }
}
