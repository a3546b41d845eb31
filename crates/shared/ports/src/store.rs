use std::time::Duration;

use argus_core::{Direction, SignalDecision};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Store-side failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate signal id: {0}")]
    DuplicateSignal(Uuid),

    #[error("Unknown signal id: {0}")]
    UnknownSignal(Uuid),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Lifecycle of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    ClosedWin,
    ClosedLose,
}

/// One advisory trade, keyed by its signal id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub signal_id: Uuid,
    pub instrument: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub confidence: u8,
    pub opened_at: DateTime<Utc>,
    pub status: TradeStatus,
    /// Set when the trade is closed
    pub exit_price: Option<Decimal>,
    pub pips_gained: Option<Decimal>,
    /// Virtual profit/loss in account currency, set when closed
    pub profit_loss: Option<Decimal>,
    pub evaluation_mode: bool,
}

impl TradeRecord {
    /// Open record built from an emitted decision
    pub fn from_decision(decision: &SignalDecision, evaluation_mode: bool) -> Self {
        Self {
            signal_id: decision.id,
            instrument: decision.instrument.clone(),
            direction: decision.direction,
            entry_price: decision.entry,
            stop_loss: decision.stop_loss,
            take_profit: decision.take_profit,
            confidence: decision.confidence,
            opened_at: decision.generated_at,
            status: TradeStatus::Open,
            exit_price: None,
            pips_gained: None,
            profit_loss: None,
            evaluation_mode,
        }
    }
}

/// Aggregate performance over a trailing window of closed trades
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage, 0 when there are no closed trades
    pub win_rate: Decimal,
    pub total_profit_loss: Decimal,
    pub best_trade_pips: Option<Decimal>,
    pub worst_trade_pips: Option<Decimal>,
}

/// Persistence collaborator contract
///
/// Consumed by the runner, not owned: the production backend lives outside
/// this repository. The in-memory reference implementation in the runner
/// crate backs tests and standalone operation.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Append a trade record; signal ids are unique
    async fn record_trade(&self, trade: TradeRecord) -> Result<(), StoreError>;

    /// Record the result of a previously opened trade
    async fn close_trade(
        &self,
        signal_id: Uuid,
        exit_price: Decimal,
        pips_gained: Decimal,
        profit_loss: Decimal,
        status: TradeStatus,
    ) -> Result<(), StoreError>;

    /// Most recent trades, newest first
    async fn recent_trades(&self, limit: usize) -> Result<Vec<TradeRecord>, StoreError>;

    /// Aggregate closed trades over the trailing window
    async fn performance(&self, window_hours: u32) -> Result<PerformanceReport, StoreError>;

    /// Append a feed-health log entry
    async fn record_feed_health(
        &self,
        delay: Duration,
        status: &str,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Small key/value state, e.g. the final snapshot written at shutdown
    async fn set_state(&self, key: &str, value: String) -> Result<(), StoreError>;

    async fn get_state(&self, key: &str) -> Result<Option<String>, StoreError>;
}
