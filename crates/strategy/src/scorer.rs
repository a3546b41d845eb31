//! Signal Scoring
//!
//! Combines indicator outcomes from two timeframes into a weighted
//! confidence score per direction. Trend comes from the higher timeframe,
//! momentum and oscillator state from the lower. The scorer is pure: it
//! reads candle series and produces a direction plus confidence, or nothing.

use argus_core::{CandleSeries, Direction};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::indicators;

/// Scoring weights per indicator outcome
const TREND_WEIGHT: u32 = 25;
const MOMENTUM_WEIGHT: u32 = 20;
const OSCILLATOR_WEIGHT: u32 = 20;
const CROSSOVER_WEIGHT: u32 = 30;
const BASE_WEIGHT: u32 = 5;

/// Scorer configuration
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// EMA periods on the higher timeframe
    pub ema_fast: usize,
    pub ema_medium: usize,
    pub ema_slow: usize,
    /// RSI period on the lower timeframe
    pub rsi_period: usize,
    /// Stochastic periods on the lower timeframe
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    /// ATR period for stop placement
    pub atr_period: usize,
    pub rsi_oversold: Decimal,
    pub rsi_overbought: Decimal,
    pub stoch_oversold: Decimal,
    pub stoch_overbought: Decimal,
    /// Minimum winning score for a signal to exist
    pub min_score: u32,
    /// Price units per pip
    pub pip_size: Decimal,
    /// Stop distance in pips when no ATR is available
    pub default_sl_pips: Decimal,
    /// Stop distance as a multiple of ATR
    pub atr_multiplier: Decimal,
    /// Take-profit distance as a multiple of the stop distance
    pub reward_risk_ratio: Decimal,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            ema_fast: 5,
            ema_medium: 10,
            ema_slow: 20,
            rsi_period: 14,
            stoch_k_period: 14,
            stoch_d_period: 3,
            atr_period: 14,
            rsi_oversold: dec!(30),
            rsi_overbought: dec!(70),
            stoch_oversold: dec!(20),
            stoch_overbought: dec!(80),
            min_score: 40,
            pip_size: dec!(0.01),
            default_sl_pips: dec!(25),
            atr_multiplier: dec!(1.5),
            reward_risk_ratio: dec!(1.8),
        }
    }
}

/// Winning direction with its capped score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredSignal {
    pub direction: Direction,
    /// Winning score capped at 100
    pub confidence: u8,
}

/// Stop-loss / take-profit pair for an entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLevels {
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
}

/// Weighted two-sided indicator scorer
pub struct SignalScorer {
    config: ScorerConfig,
}

impl SignalScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score both directions and pick a winner
    ///
    /// A spread above the allowed maximum rejects immediately, before any
    /// indicator work. The winner must score strictly higher than the other
    /// side and reach the minimum score; otherwise there is no signal.
    pub fn score(
        &self,
        lower: &CandleSeries,
        higher: &CandleSeries,
        spread_pips: Decimal,
        max_spread_pips: Decimal,
    ) -> Option<ScoredSignal> {
        if spread_pips > max_spread_pips {
            log::debug!(
                "[Scorer] Spread filter: {} pips > {} pips",
                spread_pips,
                max_spread_pips
            );
            return None;
        }
        if lower.is_empty() || higher.is_empty() {
            return None;
        }

        let higher_closes = higher.closes();
        let lower_closes = lower.closes();
        let lower_highs = lower.highs();
        let lower_lows = lower.lows();

        let ema_fast = indicators::ema(&higher_closes, self.config.ema_fast);
        let ema_medium = indicators::ema(&higher_closes, self.config.ema_medium);
        let ema_slow = indicators::ema(&higher_closes, self.config.ema_slow);
        let (trend_bullish, trend_bearish) = ema_alignment(&ema_fast, &ema_medium, &ema_slow);

        let rsi = indicators::rsi(&lower_closes, self.config.rsi_period);

        let stoch = indicators::stochastic(
            &lower_highs,
            &lower_lows,
            &lower_closes,
            self.config.stoch_k_period,
            self.config.stoch_d_period,
        );
        // Previous sample: same computation over the window ending one bar back
        let prev_stoch = if lower_closes.len() > 1 {
            let end = lower_closes.len() - 1;
            indicators::stochastic(
                &lower_highs[..end],
                &lower_lows[..end],
                &lower_closes[..end],
                self.config.stoch_k_period,
                self.config.stoch_d_period,
            )
        } else {
            None
        };

        let buy_score = self.side_score(
            trend_bullish,
            rsi.is_some_and(|r| r < self.config.rsi_oversold),
            stoch.is_some_and(|(k, d)| k < self.config.stoch_oversold && d < self.config.stoch_oversold),
            matches!(
                (prev_stoch, stoch),
                (Some((pk, pd)), Some((k, d))) if pk < pd && k > d
            ),
        );
        let sell_score = self.side_score(
            trend_bearish,
            rsi.is_some_and(|r| r > self.config.rsi_overbought),
            stoch.is_some_and(|(k, d)| k > self.config.stoch_overbought && d > self.config.stoch_overbought),
            matches!(
                (prev_stoch, stoch),
                (Some((pk, pd)), Some((k, d))) if pk > pd && k < d
            ),
        );

        self.select_direction(buy_score, sell_score)
    }

    /// The winner must beat the other side strictly and reach the minimum
    fn select_direction(&self, buy_score: u32, sell_score: u32) -> Option<ScoredSignal> {
        let (direction, score) = if buy_score > sell_score && buy_score >= self.config.min_score {
            (Direction::Buy, buy_score)
        } else if sell_score > buy_score && sell_score >= self.config.min_score {
            (Direction::Sell, sell_score)
        } else {
            return None;
        };

        Some(ScoredSignal {
            direction,
            confidence: score.min(100) as u8,
        })
    }

    fn side_score(&self, trend: bool, momentum: bool, oscillator: bool, crossover: bool) -> u32 {
        let mut score = BASE_WEIGHT;
        if trend {
            score += TREND_WEIGHT;
        }
        if momentum {
            score += MOMENTUM_WEIGHT;
        }
        if oscillator {
            score += OSCILLATOR_WEIGHT;
        }
        if crossover {
            score += CROSSOVER_WEIGHT;
        }
        score
    }

    /// ATR over a series at the configured period
    pub fn atr(&self, series: &CandleSeries) -> Option<Decimal> {
        indicators::atr(
            &series.highs(),
            &series.lows(),
            &series.closes(),
            self.config.atr_period,
        )
    }

    /// Stop-loss and take-profit for an entry price
    ///
    /// The stop distance is ATR-scaled when ATR is available, otherwise the
    /// fixed default pip distance. The target is the stop distance times the
    /// reward:risk ratio, on the profitable side of the entry.
    pub fn stops(&self, direction: Direction, entry: Decimal, atr: Option<Decimal>) -> StopLevels {
        let stop_distance = match atr {
            Some(atr) => atr * self.config.atr_multiplier,
            None => self.config.default_sl_pips * self.config.pip_size,
        };
        let target_distance = stop_distance * self.config.reward_risk_ratio;

        match direction {
            Direction::Buy => StopLevels {
                stop_loss: entry - stop_distance,
                take_profit: entry + target_distance,
            },
            Direction::Sell => StopLevels {
                stop_loss: entry + stop_distance,
                take_profit: entry - target_distance,
            },
        }
    }

    /// Price distance expressed in pips
    pub fn price_to_pips(&self, distance: Decimal) -> Decimal {
        distance / self.config.pip_size
    }
}

/// Bullish/bearish EMA ordering at the latest bar
fn ema_alignment(fast: &[Decimal], medium: &[Decimal], slow: &[Decimal]) -> (bool, bool) {
    match (fast.last(), medium.last(), slow.last()) {
        (Some(f), Some(m), Some(s)) => (f > m && m > s, f < m && m < s),
        _ => (false, false),
    }
}
