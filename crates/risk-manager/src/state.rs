//! Per-day trading state
//!
//! Counters the gate reads and acceptance mutates. Everything here is
//! monotonic within one trading day and reset as a unit at day rollover.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Mutable per-day risk state
///
/// Owned by the runner behind a lock; the evaluation loop mutates it on
/// acceptance, the health loop rolls it over at day change.
#[derive(Debug, Clone)]
pub struct RiskState {
    trades_today: u32,
    /// Signed realized P&L for the day, in account currency
    daily_pnl: Decimal,
    last_signal_at: Option<DateTime<Utc>>,
    paused: bool,
    current_day: NaiveDate,
}

/// Read-only snapshot for status lines and the shutdown handoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStatus {
    pub trades_today: u32,
    pub daily_pnl: Decimal,
    pub last_signal_at: Option<DateTime<Utc>>,
    pub paused: bool,
    pub current_day: NaiveDate,
}

impl RiskState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            trades_today: 0,
            daily_pnl: Decimal::ZERO,
            last_signal_at: None,
            paused: false,
            current_day: today,
        }
    }

    /// Record an accepted signal: cooldown anchor and trade count move together
    pub fn record_signal(&mut self, now: DateTime<Utc>) {
        self.last_signal_at = Some(now);
        self.trades_today += 1;
    }

    /// Fold a realized trade result into the day's P&L
    pub fn record_trade_result(&mut self, pnl: Decimal) {
        self.daily_pnl += pnl;
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::warn!("[Risk] Trading paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            log::info!("[Risk] Trading resumed");
        }
    }

    /// Reset all per-day fields when the day has changed
    ///
    /// Returns whether a rollover happened. A late call (process idle over
    /// midnight) simply rolls late.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if today == self.current_day {
            return false;
        }
        log::info!(
            "[Risk] Day rollover {} -> {}: trades={}, pnl={}",
            self.current_day,
            today,
            self.trades_today,
            self.daily_pnl
        );
        self.trades_today = 0;
        self.daily_pnl = Decimal::ZERO;
        self.last_signal_at = None;
        self.paused = false;
        self.current_day = today;
        true
    }

    /// Realized loss as a percentage of the balance, 0 while profitable
    pub fn loss_percent(&self, balance: Decimal) -> Decimal {
        if balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (-self.daily_pnl).max(Decimal::ZERO) / balance * dec!(100)
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.daily_pnl
    }

    pub fn last_signal_at(&self) -> Option<DateTime<Utc>> {
        self.last_signal_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    pub fn status(&self) -> RiskStatus {
        RiskStatus {
            trades_today: self.trades_today,
            daily_pnl: self.daily_pnl,
            last_signal_at: self.last_signal_at,
            paused: self.paused,
            current_day: self.current_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_record_signal_moves_both_fields() {
        let mut state = RiskState::new(day(1));
        let now = Utc::now();

        state.record_signal(now);
        assert_eq!(state.trades_today(), 1);
        assert_eq!(state.last_signal_at(), Some(now));
    }

    #[test]
    fn test_loss_percent_ignores_profit() {
        let mut state = RiskState::new(day(1));
        state.record_trade_result(dec!(5000));
        assert_eq!(state.loss_percent(dec!(1000000)), dec!(0));

        state.record_trade_result(dec!(-45000));
        assert_eq!(state.loss_percent(dec!(1000000)), dec!(4));
    }

    #[test]
    fn test_roll_day_resets_everything() {
        let mut state = RiskState::new(day(1));
        state.record_signal(Utc::now());
        state.record_trade_result(dec!(-100));
        state.pause();

        assert!(state.roll_day(day(2)));
        assert_eq!(state.trades_today(), 0);
        assert_eq!(state.daily_pnl(), dec!(0));
        assert_eq!(state.last_signal_at(), None);
        assert!(!state.is_paused());
        assert_eq!(state.current_day(), day(2));
    }

    #[test]
    fn test_roll_day_is_idempotent_within_a_day() {
        let mut state = RiskState::new(day(1));
        state.record_signal(Utc::now());

        assert!(!state.roll_day(day(1)));
        assert_eq!(state.trades_today(), 1);
    }
}
