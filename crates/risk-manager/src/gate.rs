//! Risk Admission Gate
//!
//! Ordered, short-circuiting checks between a scored signal and emission.
//! The gate never mutates state: on acceptance the caller records the signal
//! on [`RiskState`] while still holding whatever lock protects it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::state::RiskState;

/// Gate configuration
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Maximum acceptable quote age
    pub max_feed_delay: Duration,
    /// Daily realized-loss ceiling, percent of the balance
    pub daily_loss_limit_pct: Decimal,
    /// Minimum spacing between accepted signals
    pub cooldown: Duration,
    /// Daily trade cap; not enforced in evaluation mode
    pub max_trades_per_day: u32,
    /// Minimum confidence score, 0-100
    pub min_confidence: u8,
    /// Relaxed mode for unlimited-trade testing
    pub evaluation_mode: bool,
    /// Virtual capital the loss percentage is computed against
    pub virtual_balance: Decimal,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_feed_delay: Duration::from_secs(3),
            daily_loss_limit_pct: dec!(3),
            cooldown: Duration::from_secs(180),
            max_trades_per_day: 5,
            min_confidence: 70,
            evaluation_mode: false,
            virtual_balance: dec!(1000000),
        }
    }
}

/// Why a scored signal was not admitted
///
/// One variant per check, in check order. The `Display` rendering is the
/// reason string surfaced to logs and status queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Feed delay too high: {delay_ms}ms > {max_ms}ms")]
    FeedDelay { delay_ms: u64, max_ms: u64 },

    #[error("Bot is paused")]
    Paused,

    #[error("Daily loss limit exceeded: {loss_pct}% > {limit_pct}%")]
    DailyLoss {
        loss_pct: Decimal,
        limit_pct: Decimal,
    },

    #[error("Cooldown active: {elapsed_secs}s < {cooldown_secs}s")]
    Cooldown {
        elapsed_secs: u64,
        cooldown_secs: u64,
    },

    #[error("Max trades per day reached: {count}/{max}")]
    MaxTrades { count: u32, max: u32 },

    #[error("Confidence too low: {confidence}% < {min}%")]
    LowConfidence { confidence: u8, min: u8 },
}

/// Ordered admission checks over the per-day state
pub struct RiskGate {
    config: GateConfig,
}

impl RiskGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run every check in order, stopping at the first failure
    pub fn evaluate(
        &self,
        state: &RiskState,
        now: DateTime<Utc>,
        feed_delay: Duration,
        confidence: u8,
    ) -> Result<(), RejectReason> {
        // 1. Stale quotes disqualify everything else
        if feed_delay > self.config.max_feed_delay {
            return Err(RejectReason::FeedDelay {
                delay_ms: feed_delay.as_millis() as u64,
                max_ms: self.config.max_feed_delay.as_millis() as u64,
            });
        }

        // 2. Operator pause
        if state.is_paused() {
            return Err(RejectReason::Paused);
        }

        // 3. Daily loss ceiling
        let loss_pct = state.loss_percent(self.config.virtual_balance);
        if loss_pct > self.config.daily_loss_limit_pct {
            return Err(RejectReason::DailyLoss {
                loss_pct,
                limit_pct: self.config.daily_loss_limit_pct,
            });
        }

        // 4. Spacing since the last accepted signal
        if let Some(last) = state.last_signal_at() {
            let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.config.cooldown {
                return Err(RejectReason::Cooldown {
                    elapsed_secs: elapsed.as_secs(),
                    cooldown_secs: self.config.cooldown.as_secs(),
                });
            }
        }

        // 5. Trade cap, waived in evaluation mode
        if !self.config.evaluation_mode && state.trades_today() >= self.config.max_trades_per_day {
            return Err(RejectReason::MaxTrades {
                count: state.trades_today(),
                max: self.config.max_trades_per_day,
            });
        }

        // 6. Confidence floor
        if confidence < self.config.min_confidence {
            return Err(RejectReason::LowConfidence {
                confidence,
                min: self.config.min_confidence,
            });
        }

        Ok(())
    }
}
