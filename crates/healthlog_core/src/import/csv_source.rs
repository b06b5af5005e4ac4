//! CSV payloads: first line is the header.

use super::schema::{normalize_field_name, RawFields};
use super::{ImportError, RawDocument};
use crate::model::validation::ValidationError;

pub(super) fn read_csv(payload: &str) -> Result<RawDocument, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(payload.as_bytes());
    let header = reader
        .headers()
        .map_err(ImportError::Csv)?
        .iter()
        .map(normalize_field_name)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let row = match record {
            Ok(record) if record.len() > header.len() => Err(ValidationError::MalformedRecord(
                format!("{} fields for {} columns", record.len(), header.len()),
            )),
            Ok(record) => Ok(header
                .iter()
                .zip(record.iter())
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect::<RawFields>()),
            Err(err) => Err(ValidationError::MalformedRecord(err.to_string())),
        };
        rows.push(row);
    }

    Ok(RawDocument {
        header: (!header.is_empty()).then_some(header),
        rows,
    })
}
