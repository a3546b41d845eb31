//! Tick Aggregation
//!
//! Buffers raw quote ticks and buckets them into OHLCV candles per
//! timeframe. `aggregate` is read-only and only ever produces the bucket
//! containing the most recent tick - historical buckets are reconstructed
//! from the candle cache, never from the buffer.

use std::collections::HashMap;
use std::time::Duration;

use argus_core::{Candle, CandleSeries, SeriesUpdate, Tick, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Tick buffer plus bounded candle history per timeframe
#[derive(Debug, Default)]
pub struct TickAggregator {
    buffer: Vec<Tick>,
    cache: HashMap<Timeframe, CandleSeries>,
}

impl TickAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a quote observation to the buffer
    pub fn add_tick(&mut self, bid: Decimal, ask: Decimal, timestamp: DateTime<Utc>) {
        self.buffer.push(Tick::new(bid, ask, timestamp));
    }

    /// Build the candle for the bucket containing the most recent tick
    ///
    /// Returns the current (possibly partial) candle, or `None` when the
    /// buffer is empty. Has no side effects: calling twice without new ticks
    /// yields an identical candle.
    pub fn aggregate(&self, timeframe: &Timeframe) -> Option<Candle> {
        let latest = self.buffer.last()?;
        let open_time = timeframe.bucket_start(latest.timestamp);
        let close_time = open_time + chrono::Duration::seconds(timeframe.bucket_secs());

        let mut in_bucket = self
            .buffer
            .iter()
            .filter(|t| t.timestamp >= open_time && t.timestamp < close_time);

        let first = in_bucket.next()?;
        let mut high = first.mid;
        let mut low = first.mid;
        let mut close = first.mid;
        let mut volume: u64 = 1;

        for tick in in_bucket {
            high = high.max(tick.mid);
            low = low.min(tick.mid);
            close = tick.mid;
            volume += 1;
        }

        Some(Candle {
            timeframe: timeframe.clone(),
            open_time,
            open: first.mid,
            high,
            low,
            close,
            volume,
        })
    }

    /// Replace-or-append the candle into its timeframe's bounded history
    pub fn update_cache(&mut self, candle: Candle) -> SeriesUpdate {
        let series = self
            .cache
            .entry(candle.timeframe.clone())
            .or_insert_with(|| CandleSeries::new(candle.timeframe.clone()));
        series.push(candle)
    }

    /// Cached candle history for a timeframe
    pub fn series(&self, timeframe: &Timeframe) -> Option<&CandleSeries> {
        self.cache.get(timeframe)
    }

    /// Drop ticks older than the retention window; returns the number removed
    ///
    /// Run periodically by the evaluation loop, not per tick.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let cutoff = now - chrono::Duration::from_std(retention).unwrap_or_default();
        let before = self.buffer.len();
        self.buffer.retain(|t| t.timestamp >= cutoff);
        let removed = before - self.buffer.len();
        if removed > 0 {
            log::debug!("[Aggregator] Pruned {} stale ticks", removed);
        }
        removed
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_single_bucket_ohlcv() {
        let mut agg = TickAggregator::new();
        let t0 = 1_700_000_045; // mid-minute on purpose
        agg.add_tick(dec!(100), dec!(101), ts(t0));
        agg.add_tick(dec!(101), dec!(102), ts(t0 + 1));
        agg.add_tick(dec!(99), dec!(100), ts(t0 + 2));

        let candle = agg.aggregate(&Timeframe::new("1M")).expect("candle");
        assert_eq!(candle.open, dec!(100.5));
        assert_eq!(candle.high, dec!(101.5));
        assert_eq!(candle.low, dec!(99.5));
        assert_eq!(candle.close, dec!(99.5));
        assert_eq!(candle.volume, 3);
        assert_eq!(candle.open_time.timestamp() % 60, 0);
        assert!(candle.is_well_formed());
    }

    #[test]
    fn test_aggregate_is_read_only() {
        let mut agg = TickAggregator::new();
        agg.add_tick(dec!(100), dec!(101), ts(60));
        agg.add_tick(dec!(102), dec!(103), ts(70));

        let tf = Timeframe::new("1M");
        let first = agg.aggregate(&tf).expect("candle");
        let second = agg.aggregate(&tf).expect("candle");
        assert_eq!(first, second);
        assert_eq!(agg.buffer_len(), 2);
    }

    #[test]
    fn test_only_latest_bucket_is_returned() {
        let mut agg = TickAggregator::new();
        // One tick in an old minute, two in the current one
        agg.add_tick(dec!(50), dec!(51), ts(0));
        agg.add_tick(dec!(100), dec!(101), ts(120));
        agg.add_tick(dec!(102), dec!(103), ts(130));

        let candle = agg.aggregate(&Timeframe::new("1M")).expect("candle");
        assert_eq!(candle.open_time, ts(120));
        assert_eq!(candle.volume, 2);
        assert_eq!(candle.open, dec!(100.5));
    }

    #[test]
    fn test_empty_buffer_yields_no_candle() {
        let agg = TickAggregator::new();
        assert!(agg.aggregate(&Timeframe::new("1M")).is_none());
    }

    #[test]
    fn test_candle_bounds_invariant() {
        let mut agg = TickAggregator::new();
        let quotes = [
            (dec!(100), dec!(101)),
            (dec!(104), dec!(105)),
            (dec!(98), dec!(99)),
            (dec!(101), dec!(102)),
            (dec!(97), dec!(98)),
            (dec!(103), dec!(104)),
        ];
        for (i, (bid, ask)) in quotes.iter().enumerate() {
            agg.add_tick(*bid, *ask, ts(i as i64));
        }

        let candle = agg.aggregate(&Timeframe::new("1M")).expect("candle");
        assert!(candle.high >= candle.open.max(candle.close));
        assert!(candle.low <= candle.open.min(candle.close));
        assert_eq!(candle.volume, 6);
    }

    #[test]
    fn test_update_cache_replaces_then_appends() {
        let mut agg = TickAggregator::new();
        let tf = Timeframe::new("1M");

        agg.add_tick(dec!(100), dec!(101), ts(10));
        let partial = agg.aggregate(&tf).expect("candle");
        assert_eq!(agg.update_cache(partial), SeriesUpdate::Appended);

        // Same bucket grows: replace in place
        agg.add_tick(dec!(102), dec!(103), ts(20));
        let grown = agg.aggregate(&tf).expect("candle");
        assert_eq!(agg.update_cache(grown), SeriesUpdate::Replaced);
        assert_eq!(agg.series(&tf).unwrap().len(), 1);
        assert_eq!(agg.series(&tf).unwrap().last().unwrap().volume, 2);

        // Next bucket: append
        agg.add_tick(dec!(104), dec!(105), ts(70));
        let next = agg.aggregate(&tf).expect("candle");
        assert_eq!(agg.update_cache(next), SeriesUpdate::Appended);
        assert_eq!(agg.series(&tf).unwrap().len(), 2);
    }

    #[test]
    fn test_prune_drops_only_stale_ticks() {
        let mut agg = TickAggregator::new();
        agg.add_tick(dec!(1), dec!(2), ts(0));
        agg.add_tick(dec!(1), dec!(2), ts(200));
        agg.add_tick(dec!(1), dec!(2), ts(400));

        let removed = agg.prune(ts(450), Duration::from_secs(300));
        assert_eq!(removed, 1);
        assert_eq!(agg.buffer_len(), 2);
    }
}
