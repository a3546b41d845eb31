//! Health Monitor
//!
//! Low-frequency companion loop: logs a status line, records feed-health
//! entries through the store, and performs day rollover of the risk state.
//! Rollover happens under the risk-state lock, between decisions; if the
//! process was idle across midnight the reset simply lands late.

use std::sync::Arc;
use std::time::Duration;

use argus_feed::FeedHandle;
use argus_ports::TradeStore;
use argus_risk_manager::RiskState;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{RwLock, watch};

/// Health loop configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub interval: Duration,
    /// Feed delay above which a warning entry is recorded
    pub alert_delay_threshold: Duration,
    /// Balance the loss percentage in the status line is computed against
    pub virtual_balance: Decimal,
}

/// Periodic status, feed-health logging and day rollover
pub struct HealthMonitor {
    config: HealthConfig,
    feed: FeedHandle,
    risk: Arc<RwLock<RiskState>>,
    store: Arc<dyn TradeStore>,
}

impl HealthMonitor {
    pub fn new(
        config: HealthConfig,
        feed: FeedHandle,
        risk: Arc<RwLock<RiskState>>,
        store: Arc<dyn TradeStore>,
    ) -> Self {
        Self {
            config,
            feed,
            risk,
            store,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "[Health] Monitor started ({:?} interval)",
            self.config.interval
        );
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => self.check().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("[Health] Monitor stopped");
    }

    async fn check(&self) {
        let now = Utc::now();
        let snapshot = self.feed.snapshot().await;
        let delay = snapshot.delay(now);
        let tick_rate = self.feed.tick_rate(now).await;

        let status = {
            let mut risk = self.risk.write().await;
            risk.roll_day(now.date_naive());
            risk.status()
        };

        let (health_status, message) = if delay > self.config.alert_delay_threshold {
            log::warn!("[Health] High feed delay: {:.2}s", delay.as_secs_f64());
            ("HIGH_DELAY", format!("Delay {:.2}s", delay.as_secs_f64()))
        } else {
            ("OK", "Health check".to_string())
        };
        if let Err(e) = self
            .store
            .record_feed_health(delay, health_status, &message)
            .await
        {
            log::error!("[Health] Failed to record feed health: {}", e);
        }

        let loss_pct = if status.daily_pnl < Decimal::ZERO && self.config.virtual_balance > Decimal::ZERO
        {
            -status.daily_pnl / self.config.virtual_balance * Decimal::from(100u64)
        } else {
            Decimal::ZERO
        };
        log::info!(
            "[Health] feed={} delay={:.2}s rate={:.2}tps ticks={} reconnects={} | trades={} loss={}% paused={}",
            snapshot.status,
            delay.as_secs_f64(),
            tick_rate,
            snapshot.ticks_total,
            snapshot.reconnects,
            status.trades_today,
            loss_pct.round_dp(2),
            status.paused,
        );
    }
}
