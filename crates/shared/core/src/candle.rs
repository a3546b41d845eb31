use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

/// Default bound on candle history per timeframe
pub const DEFAULT_SERIES_CAP: usize = 100;

/// OHLCV aggregate over one time bucket
///
/// Identity is (timeframe, open_time). A well-formed candle satisfies
/// `high >= max(open, close)` and `low <= min(open, close)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timeframe: Timeframe,
    /// Bucket start
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Tick count within the bucket
    pub volume: u64,
}

impl Candle {
    pub fn is_well_formed(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Outcome of pushing a candle into a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUpdate {
    /// New bucket, appended at the back
    Appended,
    /// Same open_time as the latest entry, replaced in place
    Replaced,
    /// Older than the latest entry, dropped
    OutOfOrder,
}

/// Bounded, ordered candle history for one timeframe
///
/// open_time is strictly increasing across entries. Pushing a candle that
/// shares open_time with the latest entry replaces it (the evolving partial
/// bucket); a newer open_time appends and evicts from the front once the cap
/// is reached.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    timeframe: Timeframe,
    candles: Vec<Candle>,
    cap: usize,
}

impl CandleSeries {
    pub fn new(timeframe: Timeframe) -> Self {
        Self::with_cap(timeframe, DEFAULT_SERIES_CAP)
    }

    pub fn with_cap(timeframe: Timeframe, cap: usize) -> Self {
        Self {
            timeframe,
            candles: Vec::new(),
            cap,
        }
    }

    pub fn timeframe(&self) -> &Timeframe {
        &self.timeframe
    }

    /// Replace-or-append update, bounded at the cap
    pub fn push(&mut self, candle: Candle) -> SeriesUpdate {
        match self.candles.last_mut() {
            Some(last) if candle.open_time == last.open_time => {
                *last = candle;
                SeriesUpdate::Replaced
            }
            Some(last) if candle.open_time < last.open_time => SeriesUpdate::OutOfOrder,
            _ => {
                self.candles.push(candle);
                if self.candles.len() > self.cap {
                    let excess = self.candles.len() - self.cap;
                    self.candles.drain(..excess);
                }
                SeriesUpdate::Appended
            }
        }
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.low).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(open_time_secs: i64, close: Decimal) -> Candle {
        Candle {
            timeframe: Timeframe::new("1M"),
            open_time: DateTime::from_timestamp(open_time_secs, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1,
        }
    }

    #[test]
    fn test_push_appends_new_buckets() {
        let mut series = CandleSeries::new(Timeframe::new("1M"));
        assert_eq!(series.push(candle(0, dec!(1))), SeriesUpdate::Appended);
        assert_eq!(series.push(candle(60, dec!(2))), SeriesUpdate::Appended);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_push_replaces_same_open_time() {
        let mut series = CandleSeries::new(Timeframe::new("1M"));
        series.push(candle(0, dec!(1)));
        assert_eq!(series.push(candle(0, dec!(5))), SeriesUpdate::Replaced);
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().close, dec!(5));
    }

    #[test]
    fn test_push_drops_out_of_order() {
        let mut series = CandleSeries::new(Timeframe::new("1M"));
        series.push(candle(60, dec!(1)));
        assert_eq!(series.push(candle(0, dec!(9))), SeriesUpdate::OutOfOrder);
        assert_eq!(series.len(), 1);
        assert_eq!(series.last().unwrap().close, dec!(1));
    }

    #[test]
    fn test_cap_evicts_from_front() {
        let mut series = CandleSeries::with_cap(Timeframe::new("1M"), 3);
        for i in 0..5 {
            series.push(candle(i * 60, Decimal::from(i)));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.as_slice()[0].close, dec!(2));
        assert_eq!(series.last().unwrap().close, dec!(4));
    }

    #[test]
    fn test_well_formed() {
        let mut c = candle(0, dec!(10));
        c.open = dec!(9);
        c.high = dec!(11);
        c.low = dec!(8);
        assert!(c.is_well_formed());

        c.high = dec!(9.5); // below close
        assert!(!c.is_well_formed());
    }
}
