//! Static reference data: drug interactions and medication info.
//!
//! # Invariants
//! - Tables are loaded once and never mutated afterwards.
//! - Every lookup is case-insensitive and ignores surrounding whitespace.
//! - Interaction lookup is symmetric: `(a, b)` and `(b, a)` hit the same entry.

pub mod interactions;
pub mod med_info;

use crate::config::CoreConfig;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub use interactions::{InteractionEntry, InteractionTable, Severity};
pub use med_info::{MedInfoTable, MedicationInfoEntry};

const BUILTIN_INTERACTIONS: &str = include_str!("data/drug_interactions.csv");
const BUILTIN_MED_INFO: &str = include_str!("data/med_info.csv");

/// Errors raised while loading dictionary tables.
#[derive(Debug)]
pub enum DictionaryError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Csv(csv::Error),
    /// A row that parsed as CSV but is not a valid entry.
    InvalidEntry { line: u64, reason: String },
    /// The same key appears twice in one table.
    DuplicateEntry { line: u64, key: String },
}

impl Display for DictionaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read `{path}`: {source}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::InvalidEntry { line, reason } => write!(f, "line {line}: {reason}"),
            Self::DuplicateEntry { line, key } => {
                write!(f, "line {line}: duplicate entry `{key}`")
            }
        }
    }
}

impl Error for DictionaryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::InvalidEntry { .. } | Self::DuplicateEntry { .. } => None,
        }
    }
}

impl From<csv::Error> for DictionaryError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Lowercased, trimmed lookup key.
pub(crate) fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn read_table_file(path: &Path) -> DictionaryResult<String> {
    std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Both reference tables, passed explicitly to whoever needs them.
#[derive(Debug, Clone)]
pub struct DrugDictionary {
    interactions: InteractionTable,
    med_info: MedInfoTable,
}

impl DrugDictionary {
    pub fn new(interactions: InteractionTable, med_info: MedInfoTable) -> Self {
        Self {
            interactions,
            med_info,
        }
    }

    /// Loads the tables compiled into the crate.
    pub fn builtin() -> DictionaryResult<Self> {
        Ok(Self::new(
            InteractionTable::from_csv_str(BUILTIN_INTERACTIONS)?,
            MedInfoTable::from_csv_str(BUILTIN_MED_INFO)?,
        ))
    }

    /// Loads each table from its configured override path, falling back to
    /// the built-in data for tables without one.
    pub fn from_config(config: &CoreConfig) -> DictionaryResult<Self> {
        let interactions = match config.interactions_path.as_deref() {
            Some(path) => InteractionTable::from_path(path)?,
            None => InteractionTable::from_csv_str(BUILTIN_INTERACTIONS)?,
        };
        let med_info = match config.med_info_path.as_deref() {
            Some(path) => MedInfoTable::from_path(path)?,
            None => MedInfoTable::from_csv_str(BUILTIN_MED_INFO)?,
        };
        log::info!(
            "event=dictionary_load module=dictionary status=ok interactions={} med_info={}",
            interactions.len(),
            med_info.len()
        );
        Ok(Self::new(interactions, med_info))
    }

    pub fn interactions(&self) -> &InteractionTable {
        &self.interactions
    }

    pub fn med_info(&self) -> &MedInfoTable {
        &self.med_info
    }

    /// Symmetric, case-insensitive pair lookup.
    pub fn check_interaction(&self, drug_a: &str, drug_b: &str) -> Option<&InteractionEntry> {
        self.interactions.check(drug_a, drug_b)
    }

    /// Every entry naming `drug` on either side.
    pub fn interactions_for(&self, drug: &str) -> Vec<&InteractionEntry> {
        self.interactions.interactions_for(drug)
    }

    /// Screens a medication list pairwise, most severe first.
    pub fn check_all<S: AsRef<str>>(&self, drugs: &[S]) -> Vec<&InteractionEntry> {
        self.interactions.check_all(drugs)
    }

    /// Case-insensitive medication info lookup.
    pub fn lookup_med_info(&self, name: &str) -> Option<&MedicationInfoEntry> {
        self.med_info.lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{DictionaryError, DrugDictionary, Severity};
    use crate::config::CoreConfig;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn builtin_tables_load() {
        let dictionary = DrugDictionary::builtin().unwrap();
        assert!(!dictionary.interactions().is_empty());
        assert!(!dictionary.med_info().is_empty());
    }

    #[test]
    fn aspirin_warfarin_is_symmetric_and_case_insensitive() {
        let dictionary = DrugDictionary::builtin().unwrap();
        let forward = dictionary.check_interaction("Aspirin", "Warfarin").unwrap();
        let backward = dictionary.check_interaction(" warfarin ", "ASPIRIN").unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn unknown_names_return_none() {
        let dictionary = DrugDictionary::builtin().unwrap();
        assert!(dictionary.check_interaction("Aspirin", "Water").is_none());
        assert!(dictionary.lookup_med_info("Unobtainium").is_none());
    }

    #[test]
    fn screening_goes_through_the_dictionary() {
        let dictionary = DrugDictionary::builtin().unwrap();
        let warfarin = dictionary.interactions_for("WARFARIN");
        assert!(!warfarin.is_empty());
        assert!(warfarin.iter().all(|entry| entry.involves("warfarin")));

        let found = dictionary.check_all(&["Simvastatin", "Aspirin", "Clarithromycin", "Warfarin"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].severity, Severity::Contraindicated);
        assert_eq!(found[1].severity, Severity::High);
        assert!(dictionary.check_all(&["Aspirin"]).is_empty());
    }

    #[test]
    fn config_override_path_replaces_builtin_table() {
        let dir = unique_temp_dir("healthlog-dictionary");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("interactions.csv");
        fs::write(
            &path,
            "drug_a,drug_b,severity,description\nAlpha,Beta,low,test pair\n",
        )
        .unwrap();

        let config = CoreConfig {
            interactions_path: Some(path),
            ..CoreConfig::default()
        };
        let dictionary = DrugDictionary::from_config(&config).unwrap();
        assert_eq!(dictionary.interactions().len(), 1);
        assert!(dictionary.check_interaction("beta", "alpha").is_some());
        assert!(dictionary.lookup_med_info("aspirin").is_some());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_override_file_is_an_io_error() {
        let config = CoreConfig {
            med_info_path: Some(unique_temp_dir("healthlog-missing").join("none.csv")),
            ..CoreConfig::default()
        };
        let err = DrugDictionary::from_config(&config).unwrap_err();
        assert!(matches!(err, DictionaryError::Io { .. }));
    }
}
