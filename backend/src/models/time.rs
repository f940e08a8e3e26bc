//! Timestamp normalization.
//!
//! Video records carry their creation instant under one of several field
//! names and in several encodings. Everything is reduced to a naive UTC
//! instant; no timezone conversion is applied to values without an offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::documents::{ExtendedDate, RawTimestamp, RawVideoRecord};

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Resolve the canonical creation instant of a video.
///
/// Candidates are tried in order `created_at`, `createdAt`, `creation_date` on
/// the full record, then the same aliases on the embedded lineup entry. The
/// first candidate that parses wins. Returns `None` when nothing parses.
pub fn normalize_creation_time(
    record: &RawVideoRecord,
    embedded: Option<&RawVideoRecord>,
) -> Option<NaiveDateTime> {
    record
        .timestamp_candidates()
        .into_iter()
        .chain(embedded.into_iter().flat_map(|e| e.timestamp_candidates()))
        .flatten()
        .find_map(RawTimestamp::to_naive_utc)
}

impl RawTimestamp {
    /// Interpret this value as a UTC instant.
    pub fn to_naive_utc(&self) -> Option<NaiveDateTime> {
        match self {
            RawTimestamp::Text(text) => parse_iso_timestamp(text),
            RawTimestamp::Extended { date } => match date {
                ExtendedDate::Iso(text) => parse_iso_timestamp(text),
                ExtendedDate::Millis(millis) => from_epoch_millis(*millis),
                ExtendedDate::NumberLong { millis } => {
                    millis.trim().parse().ok().and_then(from_epoch_millis)
                }
            },
        }
    }
}

/// Parse an ISO-8601 timestamp.
///
/// A single trailing `Z` is stripped and the remainder read as UTC. Values with
/// an explicit numeric offset are shifted to UTC. A bare date means midnight.
pub fn parse_iso_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    let stripped = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stripped, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(stripped, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_camel_case_beats_creation_date() {
        let record = RawVideoRecord::from_value(&json!({
            "createdAt": "2024-01-01T00:00:00Z",
            "creation_date": "2024-01-02T00:00:00"
        }));

        let normalized = normalize_creation_time(&record, None).unwrap();
        assert_eq!(normalized, ts("2024-01-01 00:00:00"));
        assert_eq!(
            normalized.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-01-01T00:00:00"
        );
    }

    #[test]
    fn test_snake_case_beats_camel_case() {
        let record = RawVideoRecord::from_value(&json!({
            "created_at": "2023-05-05T05:00:00",
            "createdAt": "2024-01-01T00:00:00Z"
        }));
        assert_eq!(
            normalize_creation_time(&record, None),
            Some(ts("2023-05-05 05:00:00"))
        );
    }

    #[test]
    fn test_falls_back_to_embedded_entry() {
        let record = RawVideoRecord::from_value(&json!({"clips": []}));
        let embedded = RawVideoRecord::from_value(&json!({
            "created_at": {"$date": "2024-03-04T10:15:00Z"}
        }));

        assert_eq!(
            normalize_creation_time(&record, Some(&embedded)),
            Some(ts("2024-03-04 10:15:00"))
        );
    }

    #[test]
    fn test_unparseable_candidate_is_skipped() {
        let record = RawVideoRecord::from_value(&json!({
            "created_at": "yesterday",
            "creation_date": "2024-02-02 08:30:00"
        }));
        assert_eq!(
            normalize_creation_time(&record, None),
            Some(ts("2024-02-02 08:30:00"))
        );
    }

    #[test]
    fn test_nothing_parseable() {
        let record = RawVideoRecord::from_value(&json!({"created_at": "soon"}));
        let embedded = RawVideoRecord::from_value(&json!({}));
        assert_eq!(normalize_creation_time(&record, Some(&embedded)), None);
    }

    #[test]
    fn test_parse_iso_variants() {
        assert_eq!(
            parse_iso_timestamp("2024-01-01T12:30:45.123456Z").map(|d| d.format("%H:%M:%S").to_string()),
            Some("12:30:45".to_string())
        );
        assert_eq!(parse_iso_timestamp("2024-01-01"), Some(ts("2024-01-01 00:00:00")));
        assert_eq!(parse_iso_timestamp("2024-01-01T12:30"), Some(ts("2024-01-01 12:30:00")));
        assert_eq!(
            parse_iso_timestamp("2024-01-01T02:00:00+02:00"),
            Some(ts("2024-01-01 00:00:00"))
        );
        assert_eq!(parse_iso_timestamp("not a date"), None);
    }

    #[test]
    fn test_extended_millis() {
        let raw = RawTimestamp::Extended {
            date: ExtendedDate::Millis(1_709_546_400_000),
        };
        assert_eq!(raw.to_naive_utc(), Some(ts("2024-03-04 10:00:00")));
    }
}
