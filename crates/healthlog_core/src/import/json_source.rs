//! JSON payloads: a top-level array of flat objects.

use super::schema::{normalize_field_name, RawFields};
use super::{ImportError, RawDocument};
use crate::model::validation::ValidationError;
use serde_json::Value;

pub(super) fn read_json(payload: &str) -> Result<RawDocument, ImportError> {
    let document = serde_json::from_str::<Value>(payload).map_err(ImportError::Json)?;
    let Value::Array(items) = document else {
        return Err(ImportError::NotAnArray);
    };

    let rows = items.iter().map(object_fields).collect();
    Ok(RawDocument { header: None, rows })
}

fn object_fields(item: &Value) -> Result<RawFields, ValidationError> {
    let Value::Object(object) = item else {
        return Err(ValidationError::MalformedRecord(format!(
            "expected an object, got {}",
            value_kind(item)
        )));
    };

    let mut fields = RawFields::new();
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ValidationError::MalformedRecord(format!(
                    "field `{key}` must be a scalar, got {}",
                    value_kind(value)
                )));
            }
        };
        fields.insert(normalize_field_name(key), text);
    }
    Ok(fields)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::read_json;
    use crate::import::ImportError;

    #[test]
    fn numbers_and_strings_become_text_fields() {
        let document =
            read_json(r#"[{"Date": "2024-03-04", "steps": 8000, "calories": null}]"#).unwrap();
        let row = document.rows[0].as_ref().unwrap();
        assert_eq!(row.get("date").map(String::as_str), Some("2024-03-04"));
        assert_eq!(row.get("steps").map(String::as_str), Some("8000"));
        assert!(!row.contains_key("calories"));
    }

    #[test]
    fn non_object_items_are_row_level_failures() {
        let document = read_json(r#"[1, {"date": "2024-03-04", "steps": [1]}]"#).unwrap();
        assert!(document.rows[0].is_err());
        assert!(document.rows[1].is_err());
    }

    #[test]
    fn top_level_object_is_rejected() {
        assert!(matches!(
            read_json(r#"{"date": "2024-03-04"}"#),
            Err(ImportError::NotAnArray)
        ));
        assert!(matches!(read_json("[1,"), Err(ImportError::Json(_))));
    }
}
