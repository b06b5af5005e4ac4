//! Date/time parsing and storage encoding.
//!
//! # Invariants
//! - Storage encodings are fixed-width so lexical order equals time order.
//! - Stored times are minute precision; stored date-times are second precision.

use crate::model::validation::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const TIME_FORMAT: &str = "%H:%M";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date or date-time into local wall-clock time.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DDTHH:MM[:SS[.fff]]`, the same
/// with a space separator, and RFC 3339 with an offset (kept as the wall
/// clock of that offset).
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(truncate_to_second(parsed));
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate_to_second(parsed.naive_local()));
    }

    Err(ValidationError::InvalidFormat {
        field,
        value: trimmed.to_string(),
        expected: "ISO-8601 date or date-time",
    })
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field,
        value: trimmed.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Parses `HH:MM` (or `HH:MM:SS`, seconds dropped) into a time of day.
pub fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(truncate_to_minute)
        .map_err(|_| ValidationError::InvalidFormat {
            field,
            value: trimmed.to_string(),
            expected: "HH:MM",
        })
}

pub(crate) fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(time)
}

pub(crate) fn truncate_to_second(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}

pub(crate) fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_date, parse_time_of_day, parse_timestamp};
    use crate::model::validation::ValidationError;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn timestamp_accepts_date_only_as_midnight() {
        let parsed = parse_timestamp("recorded_at", "2024-03-05").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn timestamp_accepts_common_iso_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 30, 15)
            .unwrap();
        for input in [
            "2024-03-05T07:30:15",
            "2024-03-05 07:30:15",
            "2024-03-05T07:30:15.250",
            "2024-03-05T07:30:15+02:00",
        ] {
            assert_eq!(parse_timestamp("recorded_at", input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn timestamp_rejects_garbage() {
        let err = parse_timestamp("recorded_at", "yesterday").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn time_of_day_drops_seconds() {
        assert_eq!(
            parse_time_of_day("time", "08:30:59").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_time_of_day("time", "25:00").is_err());
    }

    #[test]
    fn date_rejects_datetime_input() {
        assert!(parse_date("start_date", "2024-03-05T10:00").is_err());
    }
}
