//! Client timestamp resolution
//!
//! Devices send ISO-8601 timestamps with a local offset (the original
//! firmware sends "+07:00"). Offsets are converted to UTC; a timestamp
//! without an offset is taken as already-UTC. Unparseable or missing
//! input resolves to `None` and the caller substitutes server time.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a caller-supplied ISO-8601 timestamp into UTC
///
/// Returns `None` for missing or unparseable input; the substitution of
/// server time is the orchestration layer's decision, not an error.
pub fn parse_client_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    // Offset-carrying form first: "2024-03-01T08:30:00+07:00"
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Naive form "2024-03-01T08:30:00[.fff]" treated as UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_offset_converted_to_utc() {
        let parsed = parse_client_timestamp(Some("2024-03-01T08:30:00+07:00")).unwrap();
        assert_eq!(parsed.hour(), 1);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn test_naive_taken_as_utc() {
        let parsed = parse_client_timestamp(Some("2024-03-01T08:30:00")).unwrap();
        assert_eq!(parsed.hour(), 8);
    }

    #[test]
    fn test_fractional_seconds() {
        let parsed = parse_client_timestamp(Some("2024-03-01T08:30:00.250")).unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_unparseable_is_none() {
        assert!(parse_client_timestamp(None).is_none());
        assert!(parse_client_timestamp(Some("")).is_none());
        assert!(parse_client_timestamp(Some("yesterday")).is_none());
        assert!(parse_client_timestamp(Some("2024-13-99T99:99:99")).is_none());
    }
}
