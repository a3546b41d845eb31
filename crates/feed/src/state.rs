use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

/// Width of the trailing window backing the tick-rate metric
const TICK_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Link state of the quote feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedStatus::Disconnected => f.write_str("DISCONNECTED"),
            FeedStatus::Connecting => f.write_str("CONNECTING"),
            FeedStatus::Connected => f.write_str("CONNECTED"),
        }
    }
}

/// Latest bid/ask pair, updated as one unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
    pub received_at: DateTime<Utc>,
}

impl Quote {
    /// Bid/ask spread expressed in pips
    pub fn spread_pips(&self, pip_size: Decimal) -> Decimal {
        (self.ask - self.bid) / pip_size
    }
}

/// Point-in-time view of the feed, taken under one lock acquisition
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub status: FeedStatus,
    pub quote: Option<Quote>,
    pub last_tick_at: DateTime<Utc>,
    pub ticks_total: u64,
    pub reconnects: u32,
}

impl FeedSnapshot {
    /// Quote age: now minus the last tick's arrival time
    pub fn delay(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_tick_at).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug)]
struct LinkState {
    status: FeedStatus,
    quote: Option<Quote>,
    /// Arrival time of the last tick; seeded with the handle's creation time
    /// so the delay metric is meaningful before the first tick
    last_tick_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Shared {
    link: RwLock<LinkState>,
    ticks_total: AtomicU64,
    reconnects: AtomicU32,
    tick_window: Mutex<VecDeque<DateTime<Utc>>>,
}

/// Cloneable handle onto the shared feed state
///
/// The ingestion task is the only writer; the evaluation and health loops
/// read through snapshots. The quote group (bid, ask, arrival time) is
/// updated under a single lock so no reader ever observes a half-updated
/// pair; counters are plain atomics.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    shared: Arc<Shared>,
}

impl FeedHandle {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            shared: Arc::new(Shared {
                link: RwLock::new(LinkState {
                    status: FeedStatus::Disconnected,
                    quote: None,
                    last_tick_at: now,
                }),
                ticks_total: AtomicU64::new(0),
                reconnects: AtomicU32::new(0),
                tick_window: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub async fn set_status(&self, status: FeedStatus) {
        let mut link = self.shared.link.write().await;
        link.status = status;
    }

    /// Record an inbound tick: quote fields and arrival time move together
    pub async fn apply_tick(&self, bid: Decimal, ask: Decimal, now: DateTime<Utc>) {
        {
            let mut link = self.shared.link.write().await;
            link.quote = Some(Quote {
                bid,
                ask,
                received_at: now,
            });
            link.last_tick_at = now;
        }
        self.shared.ticks_total.fetch_add(1, Ordering::Relaxed);

        let mut window = self.shared.tick_window.lock().await;
        window.push_back(now);
        Self::prune_window(&mut window, now);
    }

    pub fn record_reconnect(&self) {
        self.shared.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let link = self.shared.link.read().await;
        FeedSnapshot {
            status: link.status,
            quote: link.quote,
            last_tick_at: link.last_tick_at,
            ticks_total: self.shared.ticks_total.load(Ordering::Relaxed),
            reconnects: self.shared.reconnects.load(Ordering::Relaxed),
        }
    }

    /// Ticks observed in the trailing 60 s window, divided by 60
    pub async fn tick_rate(&self, now: DateTime<Utc>) -> f64 {
        let mut window = self.shared.tick_window.lock().await;
        Self::prune_window(&mut window, now);
        window.len() as f64 / TICK_RATE_WINDOW.as_secs_f64()
    }

    fn prune_window(window: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
        let cutoff = now
            - chrono::Duration::from_std(TICK_RATE_WINDOW).unwrap_or(chrono::Duration::seconds(60));
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_quote_updates_as_one_snapshot() {
        let now = Utc::now();
        let handle = FeedHandle::new(now);
        handle.apply_tick(dec!(2400.10), dec!(2400.35), now).await;

        let snap = handle.snapshot().await;
        let quote = snap.quote.expect("quote set");
        assert_eq!(quote.bid, dec!(2400.10));
        assert_eq!(quote.ask, dec!(2400.35));
        assert_eq!(snap.last_tick_at, now);
        assert_eq!(snap.ticks_total, 1);
    }

    #[tokio::test]
    async fn test_delay_measures_quote_age() {
        let start = Utc::now();
        let handle = FeedHandle::new(start);
        handle.apply_tick(dec!(1), dec!(2), start).await;

        let later = start + chrono::Duration::seconds(10);
        let snap = handle.snapshot().await;
        assert_eq!(snap.delay(later), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_tick_rate_uses_trailing_window() {
        let start = Utc::now();
        let handle = FeedHandle::new(start);

        // 30 stale ticks before the window, then 30 inside it
        for i in (0..30).rev() {
            let at = start - chrono::Duration::seconds(120 + i);
            handle.apply_tick(dec!(1), dec!(2), at).await;
        }
        for i in (0..30).rev() {
            let at = start - chrono::Duration::seconds(i);
            handle.apply_tick(dec!(1), dec!(2), at).await;
        }

        let rate = handle.tick_rate(start).await;
        assert!((rate - 0.5).abs() < f64::EPSILON, "rate was {rate}");
    }

    #[test]
    fn test_spread_pips() {
        let quote = Quote {
            bid: dec!(2400.10),
            ask: dec!(2400.35),
            received_at: Utc::now(),
        };
        assert_eq!(quote.spread_pips(dec!(0.01)), dec!(25));
    }
}
