//! Read-time timestamps
//!
//! A bundle tracks one read timestamp per document/query plus a single
//! watermark (the maximum read time across all inputs). The wire form is an
//! RFC 3339 UTC string with 0, 3, 6, or 9 fractional digits — the shortest
//! representation that is exact, matching the proto3 JSON timestamp
//! convention used by the document protocol.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// A point in time with nanosecond precision
///
/// Represented as seconds since the Unix epoch plus a non-negative
/// sub-second nanosecond component in `[0, 1_000_000_000)`. Instants before
/// the epoch carry negative `seconds` with `nanos` still counting forward,
/// so the derived ordering over `(seconds, nanos)` is the temporal order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// The zero timestamp (Unix epoch, zero nanoseconds)
    pub const EPOCH: Timestamp = Timestamp {
        seconds: 0,
        nanos: 0,
    };

    /// Create a timestamp, carrying overflowing nanoseconds into seconds
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: seconds + (nanos / NANOS_PER_SECOND) as i64,
            nanos: nanos % NANOS_PER_SECOND,
        }
    }

    /// Seconds since the Unix epoch
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second nanoseconds, always in `[0, 1_000_000_000)`
    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Whether this is the zero timestamp
    pub fn is_epoch(&self) -> bool {
        *self == Self::EPOCH
    }

    /// Format as an RFC 3339 UTC string with 0/3/6/9 fractional digits
    ///
    /// Returns `None` if the seconds value is outside the range chrono can
    /// represent as a calendar date.
    pub fn to_rfc3339(&self) -> Option<String> {
        let datetime = DateTime::<Utc>::from_timestamp(self.seconds, self.nanos)?;
        let base = datetime.format("%Y-%m-%dT%H:%M:%S");
        let out = if self.nanos == 0 {
            format!("{base}Z")
        } else if self.nanos % 1_000_000 == 0 {
            format!("{base}.{:03}Z", self.nanos / 1_000_000)
        } else if self.nanos % 1_000 == 0 {
            format!("{base}.{:06}Z", self.nanos / 1_000)
        } else {
            format!("{base}.{:09}Z", self.nanos)
        };
        Some(out)
    }

    /// Parse an RFC 3339 string (any offset is normalized to UTC)
    pub fn parse_rfc3339(s: &str) -> Result<Self, chrono::ParseError> {
        let datetime = DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc);
        Ok(Self::from(datetime))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self {
            seconds: datetime.timestamp(),
            nanos: datetime.timestamp_subsec_nanos() % NANOS_PER_SECOND,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(s) => f.write_str(&s),
            None => write!(f, "{}s+{}ns", self.seconds, self.nanos),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = self
            .to_rfc3339()
            .ok_or_else(|| serde::ser::Error::custom("timestamp out of representable range"))?;
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimestampVisitor;

        impl Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an RFC 3339 timestamp string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
                Timestamp::parse_rfc3339(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_default_and_zero() {
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
        assert_eq!(Timestamp::EPOCH.seconds(), 0);
        assert_eq!(Timestamp::EPOCH.nanos(), 0);
        assert!(Timestamp::EPOCH.is_epoch());
        assert!(!Timestamp::new(1, 0).is_epoch());
    }

    #[test]
    fn test_new_carries_nanos_into_seconds() {
        let ts = Timestamp::new(10, 2_500_000_000);
        assert_eq!(ts.seconds(), 12);
        assert_eq!(ts.nanos(), 500_000_000);
    }

    #[test]
    fn test_ordering_is_temporal() {
        let a = Timestamp::new(5, 999_999_999);
        let b = Timestamp::new(6, 0);
        let c = Timestamp::new(6, 1);
        assert!(a < b);
        assert!(b < c);
        assert!(Timestamp::new(-1, 500_000_000) < Timestamp::EPOCH);
    }

    #[test]
    fn test_rfc3339_fraction_width() {
        assert_eq!(
            Timestamp::new(0, 0).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00Z"
        );
        assert_eq!(
            Timestamp::new(0, 500_000_000).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00.500Z"
        );
        assert_eq!(
            Timestamp::new(0, 1_500).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00.000001500Z"
        );
        assert_eq!(
            Timestamp::new(0, 1_000).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00.000001Z"
        );
        assert_eq!(
            Timestamp::new(0, 1).to_rfc3339().unwrap(),
            "1970-01-01T00:00:00.000000001Z"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let ts = Timestamp::new(1_700_000_123, 456_789_000);
        let s = ts.to_rfc3339().unwrap();
        let parsed = Timestamp::parse_rfc3339(&s).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_serde_round_trip() {
        let ts = Timestamp::new(1_700_000_000, 42);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.starts_with('"') && json.ends_with('"'));
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_deserialize_normalizes_offset() {
        let parsed: Timestamp = serde_json::from_str("\"2023-01-01T01:00:00+01:00\"").unwrap();
        let utc: Timestamp = serde_json::from_str("\"2023-01-01T00:00:00Z\"").unwrap();
        assert_eq!(parsed, utc);
    }
}
