//! XML payloads: repeated `<row>` or `<record>` elements.
//!
//! Each child element of a record is one field. Attributes on the record
//! element are fields too, so `<row date="2024-03-04" steps="8000"/>` works.

use super::schema::{normalize_field_name, RawFields};
use super::{ImportError, RawDocument};
use crate::model::validation::ValidationError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const RECORD_ELEMENTS: &[&str] = &["row", "record"];

struct OpenRecord {
    depth: usize,
    fields: RawFields,
    current_field: Option<(String, String)>,
    problem: Option<String>,
}

pub(super) fn read_xml(payload: &str) -> Result<RawDocument, ImportError> {
    let mut reader = Reader::from_str(payload);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut open: Option<OpenRecord> = None;
    let mut rows = Vec::new();

    loop {
        let event = reader.read_event().map_err(|err| {
            ImportError::Xml(format!("{err} at byte {}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => {
                depth += 1;
                let name = element_name(&start);
                if let Some(record) = open.as_mut() {
                    if depth == record.depth + 1 {
                        record.current_field = Some((normalize_field_name(&name), String::new()));
                    } else {
                        record.problem.get_or_insert_with(|| {
                            format!("element `{name}` is nested inside a field")
                        });
                    }
                } else if is_record_element(&name) {
                    open = Some(begin_record(&start, depth));
                }
            }
            Event::Empty(start) => {
                let name = element_name(&start);
                if let Some(record) = open.as_mut() {
                    if depth == record.depth {
                        record
                            .fields
                            .insert(normalize_field_name(&name), String::new());
                    } else {
                        record.problem.get_or_insert_with(|| {
                            format!("element `{name}` is nested inside a field")
                        });
                    }
                } else if is_record_element(&name) {
                    rows.push(finish_record(begin_record(&start, depth + 1)));
                }
            }
            Event::Text(text) => {
                if let Some((_, value)) = open
                    .as_mut()
                    .and_then(|record| record.current_field.as_mut())
                {
                    let unescaped = text
                        .unescape()
                        .map_err(|err| ImportError::Xml(err.to_string()))?;
                    value.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = open
                    .as_mut()
                    .and_then(|record| record.current_field.as_mut())
                {
                    value.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(record) = open.as_mut() {
                    if depth == record.depth + 1 {
                        if let Some((name, value)) = record.current_field.take() {
                            record.fields.insert(name, value);
                        }
                    } else if depth == record.depth {
                        if let Some(record) = open.take() {
                            rows.push(finish_record(record));
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 || open.is_some() {
        return Err(ImportError::Xml(
            "document ended inside an open element".to_string(),
        ));
    }
    Ok(RawDocument { header: None, rows })
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn is_record_element(name: &str) -> bool {
    RECORD_ELEMENTS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

fn begin_record(start: &BytesStart<'_>, depth: usize) -> OpenRecord {
    let mut record = OpenRecord {
        depth,
        fields: RawFields::new(),
        current_field: None,
        problem: None,
    };
    for attribute in start.attributes() {
        match attribute {
            Ok(attribute) => {
                let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
                match attribute.unescape_value() {
                    Ok(value) => {
                        record
                            .fields
                            .insert(normalize_field_name(&key), value.into_owned());
                    }
                    Err(err) => {
                        record.problem.get_or_insert_with(|| err.to_string());
                    }
                }
            }
            Err(err) => {
                record.problem.get_or_insert_with(|| err.to_string());
            }
        }
    }
    record
}

fn finish_record(record: OpenRecord) -> Result<RawFields, ValidationError> {
    match record.problem {
        Some(problem) => Err(ValidationError::MalformedRecord(problem)),
        None => Ok(record
            .fields
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect()),
    }
}
