use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
        }
    }
}

/// Advisory decision record emitted once per accepted evaluation cycle
///
/// This is the terminal output of the pipeline, handed to the notification
/// and persistence collaborators. It is immutable after construction; no
/// order is ever routed from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDecision {
    pub id: Uuid,
    pub instrument: String,
    pub direction: Direction,
    /// Weighted indicator score, 0-100
    pub confidence: u8,
    /// Entry price: ask for BUY, bid for SELL
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Bid/ask spread at emission, in pips
    pub spread_pips: Decimal,
    /// Quote age at emission
    pub feed_delay: Duration,
    /// Distance entry -> stop, in pips
    pub risk_pips: Decimal,
    /// Distance entry -> target, in pips
    pub reward_pips: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl SignalDecision {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instrument: impl Into<String>,
        direction: Direction,
        confidence: u8,
        entry: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        spread_pips: Decimal,
        feed_delay: Duration,
        risk_pips: Decimal,
        reward_pips: Decimal,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            instrument: instrument.into(),
            direction,
            confidence,
            entry,
            stop_loss,
            take_profit,
            spread_pips,
            feed_delay,
            risk_pips,
            reward_pips,
            generated_at,
        }
    }
}
