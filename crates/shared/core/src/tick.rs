use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Single bid/ask quote observation
///
/// Ticks are ephemeral: they live in the aggregation buffer until they age
/// past the retention window. The mid price is fixed at construction and is
/// what candles are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
    /// Mid price, (bid + ask) / 2
    pub mid: Decimal,
}

impl Tick {
    pub fn new(bid: Decimal, ask: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            mid: (bid + ask) / dec!(2),
        }
    }

    /// Raw bid/ask spread in price units
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
