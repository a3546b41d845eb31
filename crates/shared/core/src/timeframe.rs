use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candle bucket width specifier, e.g. "1M", "5M", "1H"
///
/// The specifier is a numeric multiplier followed by a unit letter:
/// M(inute), H(our) or D(ay), case-insensitive. A missing multiplier means 1.
/// An unrecognized unit falls back to exactly 60 seconds regardless of the
/// multiplier - callers relying on the fallback get one-minute buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeframe(String);

impl Timeframe {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bucket width in seconds
    pub fn bucket_secs(&self) -> i64 {
        let spec = self.0.trim();
        let digits: &str = &spec[..spec
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(spec.len())];
        let multiplier: i64 = digits.parse().unwrap_or(1);

        match &spec[digits.len()..] {
            "M" | "m" => multiplier * 60,
            "H" | "h" => multiplier * 3600,
            "D" | "d" => multiplier * 86400,
            _ => 60,
        }
    }

    /// Start of the bucket containing `ts`
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let width = self.bucket_secs();
        let secs = ts.timestamp();
        let start = secs - secs.rem_euclid(width);
        DateTime::from_timestamp(start, 0).unwrap_or(ts)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timeframe {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_secs_units() {
        assert_eq!(Timeframe::new("1M").bucket_secs(), 60);
        assert_eq!(Timeframe::new("5M").bucket_secs(), 300);
        assert_eq!(Timeframe::new("15m").bucket_secs(), 900);
        assert_eq!(Timeframe::new("1H").bucket_secs(), 3600);
        assert_eq!(Timeframe::new("4h").bucket_secs(), 14400);
        assert_eq!(Timeframe::new("1D").bucket_secs(), 86400);
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        assert_eq!(Timeframe::new("M").bucket_secs(), 60);
        assert_eq!(Timeframe::new("H").bucket_secs(), 3600);
    }

    #[test]
    fn test_unrecognized_unit_is_flat_sixty_seconds() {
        // The fallback ignores the multiplier entirely
        assert_eq!(Timeframe::new("5X").bucket_secs(), 60);
        assert_eq!(Timeframe::new("10").bucket_secs(), 60);
        assert_eq!(Timeframe::new("").bucket_secs(), 60);
    }

    #[test]
    fn test_bucket_start_floors_to_width() {
        let tf = Timeframe::new("5M");
        let ts = DateTime::from_timestamp(1_700_000_123, 0).unwrap();
        let start = tf.bucket_start(ts);
        assert_eq!(start.timestamp() % 300, 0);
        assert!(start <= ts);
        assert!(ts.timestamp() - start.timestamp() < 300);
    }
}
