use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::readers::ReadError;

/// Timestamp layout used in Aqualog filenames.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Parse an instrument timestamp string, defaulting to the
/// `YYYY-MM-DD-HH-MM-SS` filename convention.
pub fn str_to_datetime(s: &str, format: Option<&str>) -> Result<NaiveDateTime, ReadError> {
    let format = format.unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
    Ok(NaiveDateTime::parse_from_str(s, format)?)
}

/// Parse the timestamp level of a PARAFAC scores index. OpenFluor exports
/// are not consistent here, so the common layouts are all accepted;
/// date-only entries map to midnight.
pub fn parse_score_timestamp(s: &str) -> Result<NaiveDateTime, ReadError> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        DEFAULT_TIMESTAMP_FORMAT,
    ];

    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(ts);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ReadError::Format(format!("unrecognized timestamp: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_default_format() {
        let ts = str_to_datetime("2024-01-01-13-45-30", None).unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 13);
        assert_eq!(ts.second(), 30);
    }

    #[test]
    fn test_format_override() {
        let ts = str_to_datetime("01/02/2024 10:00", Some("%d/%m/%Y %H:%M")).unwrap();
        assert_eq!(ts.month(), 2);
        assert_eq!(ts.day(), 1);
    }

    #[test]
    fn test_invalid_timestamp_propagates() {
        assert!(str_to_datetime("yesterday", None).is_err());
    }

    #[test]
    fn test_score_timestamp_layouts() {
        let iso = parse_score_timestamp("2017-05-23 12:30:00").unwrap();
        assert_eq!(iso.hour(), 12);

        let date_only = parse_score_timestamp("2017-05-23").unwrap();
        assert_eq!(date_only.hour(), 0);
        assert_eq!(date_only.day(), 23);
    }
}
