//! In-memory trade store
//!
//! Reference implementation of the persistence contract, backing tests and
//! standalone operation. A production deployment swaps this for a real
//! backend behind the same trait.

use std::collections::HashMap;
use std::time::Duration;

use argus_ports::{PerformanceReport, StoreError, TradeRecord, TradeStatus, TradeStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One feed-health observation
#[derive(Debug, Clone)]
pub struct HealthEntry {
    pub at: DateTime<Utc>,
    pub delay: Duration,
    pub status: String,
    pub message: String,
}

#[derive(Default)]
struct StoreInner {
    trades: Vec<TradeRecord>,
    health_log: Vec<HealthEntry>,
    state: HashMap<String, String>,
}

/// Everything behind one lock; contention is negligible at signal cadence
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Health log snapshot, oldest first
    pub async fn health_entries(&self) -> Vec<HealthEntry> {
        self.inner.read().await.health_log.clone()
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn record_trade(&self, trade: TradeRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.trades.iter().any(|t| t.signal_id == trade.signal_id) {
            return Err(StoreError::DuplicateSignal(trade.signal_id));
        }
        log::info!(
            "[Store] Trade recorded: {} {} @ {}",
            trade.signal_id,
            trade.direction,
            trade.entry_price
        );
        inner.trades.push(trade);
        Ok(())
    }

    async fn close_trade(
        &self,
        signal_id: Uuid,
        exit_price: Decimal,
        pips_gained: Decimal,
        profit_loss: Decimal,
        status: TradeStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let trade = inner
            .trades
            .iter_mut()
            .find(|t| t.signal_id == signal_id)
            .ok_or(StoreError::UnknownSignal(signal_id))?;

        trade.exit_price = Some(exit_price);
        trade.pips_gained = Some(pips_gained);
        trade.profit_loss = Some(profit_loss);
        trade.status = status;
        log::info!(
            "[Store] Trade closed: {} {:?} (P/L {})",
            signal_id,
            status,
            profit_loss
        );
        Ok(())
    }

    async fn recent_trades(&self, limit: usize) -> Result<Vec<TradeRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.trades.iter().rev().take(limit).cloned().collect())
    }

    async fn performance(&self, window_hours: u32) -> Result<PerformanceReport, StoreError> {
        let cutoff = Utc::now() - chrono::Duration::hours(window_hours as i64);
        let inner = self.inner.read().await;

        let closed: Vec<&TradeRecord> = inner
            .trades
            .iter()
            .filter(|t| t.status != TradeStatus::Open && t.opened_at >= cutoff)
            .collect();

        let wins = closed
            .iter()
            .filter(|t| t.profit_loss.is_some_and(|pl| pl > Decimal::ZERO))
            .count();
        let losses = closed
            .iter()
            .filter(|t| t.profit_loss.is_some_and(|pl| pl < Decimal::ZERO))
            .count();
        let total = closed.len();
        let win_rate = if total > 0 {
            Decimal::from(wins as u64) / Decimal::from(total as u64) * dec!(100)
        } else {
            Decimal::ZERO
        };

        Ok(PerformanceReport {
            total_trades: total,
            wins,
            losses,
            win_rate,
            total_profit_loss: closed.iter().filter_map(|t| t.profit_loss).sum(),
            best_trade_pips: closed.iter().filter_map(|t| t.pips_gained).max(),
            worst_trade_pips: closed.iter().filter_map(|t| t.pips_gained).min(),
        })
    }

    async fn record_feed_health(
        &self,
        delay: Duration,
        status: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.health_log.push(HealthEntry {
            at: Utc::now(),
            delay,
            status: status.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn set_state(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.state.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.state.get(key).cloned())
    }
}
