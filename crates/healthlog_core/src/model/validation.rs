//! Shared validation error for record construction and import coercion.
//!
//! # Responsibility
//! - Describe why a candidate record cannot be accepted.
//! - Stay free of user-facing wording; callers map variants to messages.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for medication, metric and goal records.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    EmptyField(&'static str),
    /// Required field is absent from an imported record.
    MissingField(&'static str),
    /// Numeric field must be `>= 0`.
    NegativeValue { field: &'static str, value: f64 },
    /// Numeric field must be finite.
    NonFiniteValue(&'static str),
    /// Goal target must be `> 0`.
    NonPositiveTarget(f64),
    /// Enum-like field holds a value outside its domain.
    UnknownVariant { field: &'static str, value: String },
    /// Field cannot be parsed into its typed representation.
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Imported item is not a record shape (e.g. a JSON scalar in the array).
    MalformedRecord(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` cannot be empty"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::NegativeValue { field, value } => {
                write!(f, "`{field}` must be >= 0, got {value}")
            }
            Self::NonFiniteValue(field) => write!(f, "`{field}` must be a finite number"),
            Self::NonPositiveTarget(value) => write!(f, "goal target must be > 0, got {value}"),
            Self::UnknownVariant { field, value } => {
                write!(f, "unknown value `{value}` for `{field}`")
            }
            Self::InvalidFormat {
                field,
                value,
                expected,
            } => write!(f, "invalid `{field}` value `{value}`; expected {expected}"),
            Self::MalformedRecord(details) => write!(f, "malformed record: {details}"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when empty.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Rejects NaN/infinite and negative numbers.
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue(field));
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{require_non_negative, require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Aspirin ").unwrap(), "Aspirin");
        assert_eq!(
            require_text("name", "   ").unwrap_err(),
            ValidationError::EmptyField("name")
        );
    }

    #[test]
    fn require_non_negative_rejects_nan_and_negatives() {
        assert!(require_non_negative("value", 0.0).is_ok());
        assert!(matches!(
            require_non_negative("value", -1.0),
            Err(ValidationError::NegativeValue { .. })
        ));
        assert_eq!(
            require_non_negative("value", f64::NAN).unwrap_err(),
            ValidationError::NonFiniteValue("value")
        );
    }
}
