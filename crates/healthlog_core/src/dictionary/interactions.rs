//! Drug-pair interaction table.

use super::{normalize_key, read_table_file, DictionaryError, DictionaryResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Clinical severity of one interaction, ordered mildest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Contraindicated,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Contraindicated => "contraindicated",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" | "major" | "severe" => Ok(Self::High),
            "contraindicated" => Ok(Self::Contraindicated),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// One known interaction. Names keep their original casing for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionEntry {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    pub description: String,
}

impl InteractionEntry {
    /// Whether `drug` is either side of this pair.
    pub fn involves(&self, drug: &str) -> bool {
        let key = normalize_key(drug);
        normalize_key(&self.drug_a) == key || normalize_key(&self.drug_b) == key
    }
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    #[serde(alias = "drugA", alias = "drug1")]
    drug_a: String,
    #[serde(alias = "drugB", alias = "drug2")]
    drug_b: String,
    severity: String,
    #[serde(default)]
    description: String,
}

type PairKey = (String, String);

fn pair_key(drug_a: &str, drug_b: &str) -> PairKey {
    let left = normalize_key(drug_a);
    let right = normalize_key(drug_b);
    if left <= right {
        (left, right)
    } else {
        (right, left)
    }
}

/// Interactions indexed by unordered, case-folded drug pair.
#[derive(Debug, Clone, Default)]
pub struct InteractionTable {
    entries: Vec<InteractionEntry>,
    index: HashMap<PairKey, usize>,
}

impl InteractionTable {
    /// Parses a CSV table with a `drug_a,drug_b,severity,description` header.
    ///
    /// # Errors
    /// - Blank names, self-pairs and unknown severities are `InvalidEntry`.
    /// - A pair listed twice in either order is `DuplicateEntry`.
    pub fn from_csv_str(data: &str) -> DictionaryResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let headers = reader.headers()?.clone();

        let mut table = Self::default();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|pos| pos.line()).unwrap_or(0);
            let row: InteractionRow = record.deserialize(Some(&headers))?;
            table.insert(row, line)?;
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> DictionaryResult<Self> {
        Self::from_csv_str(&read_table_file(path)?)
    }

    fn insert(&mut self, row: InteractionRow, line: u64) -> DictionaryResult<()> {
        if row.drug_a.is_empty() || row.drug_b.is_empty() {
            return Err(DictionaryError::InvalidEntry {
                line,
                reason: "drug name must not be blank".to_string(),
            });
        }
        let key = pair_key(&row.drug_a, &row.drug_b);
        if key.0 == key.1 {
            return Err(DictionaryError::InvalidEntry {
                line,
                reason: format!("`{}` cannot interact with itself", row.drug_a),
            });
        }
        let severity = row
            .severity
            .parse::<Severity>()
            .map_err(|reason| DictionaryError::InvalidEntry { line, reason })?;
        if self.index.contains_key(&key) {
            return Err(DictionaryError::DuplicateEntry {
                line,
                key: format!("{}+{}", key.0, key.1),
            });
        }

        self.index.insert(key, self.entries.len());
        self.entries.push(InteractionEntry {
            drug_a: row.drug_a,
            drug_b: row.drug_b,
            severity,
            description: row.description,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[InteractionEntry] {
        &self.entries
    }

    /// Looks up one pair in either order.
    pub fn check(&self, drug_a: &str, drug_b: &str) -> Option<&InteractionEntry> {
        self.index
            .get(&pair_key(drug_a, drug_b))
            .and_then(|position| self.entries.get(*position))
    }

    /// Every entry involving `drug`, in table order.
    pub fn interactions_for(&self, drug: &str) -> Vec<&InteractionEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.involves(drug))
            .collect()
    }

    /// Checks every unordered pair of `drugs`, most severe first.
    ///
    /// Repeated names in `drugs` do not produce repeated entries.
    pub fn check_all<S: AsRef<str>>(&self, drugs: &[S]) -> Vec<&InteractionEntry> {
        let mut seen = BTreeSet::new();
        let mut hits = Vec::new();
        for (position, left) in drugs.iter().enumerate() {
            for right in drugs.iter().skip(position + 1) {
                let key = pair_key(left.as_ref(), right.as_ref());
                let Some(entry_position) = self.index.get(&key).copied() else {
                    continue;
                };
                if seen.insert(entry_position) {
                    if let Some(entry) = self.entries.get(entry_position) {
                        hits.push(entry);
                    }
                }
            }
        }
        hits.sort_by(|left, right| right.severity.cmp(&left.severity));
        hits
    }
}
