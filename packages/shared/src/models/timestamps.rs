//! Fixed-width RFC 3339 timestamps.
//!
//! The repositories compare `joined_at` and `created_at` lexicographically in
//! DynamoDB filter expressions. Variable-precision RFC 3339 breaks that
//! ordering across precisions (`...56Z` sorts after `...56.123Z`), so stored
//! timestamps always carry exactly six fractional digits and filter values
//! are rendered through [`format`] to match.

use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Renders with exactly six fractional digits and a `Z` suffix.
pub fn format(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to microseconds, so a stored value round-trips
/// through [`format`] unchanged.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::microseconds(1)).unwrap_or(now)
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(*value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_is_fixed_width() {
        let whole_second = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let with_millis = whole_second + Duration::milliseconds(123);

        assert_eq!(format(whole_second), "2026-03-14T09:26:53.000000Z");
        assert_eq!(format(with_millis), "2026-03-14T09:26:53.123000Z");
    }

    #[test]
    fn test_lexicographic_order_matches_chronological() {
        let base = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let samples = [
            base,
            base + Duration::microseconds(1),
            base + Duration::milliseconds(123),
            base + Duration::milliseconds(124),
            base + Duration::seconds(1),
        ];

        for pair in samples.windows(2) {
            assert!(
                format(pair[0]) < format(pair[1]),
                "{} should sort before {}",
                format(pair[0]),
                format(pair[1])
            );
        }
    }

    #[test]
    fn test_now_round_trips_through_format() {
        let stamp = now();
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(&format(stamp))
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, stamp);
    }
}
