//! Application configuration
//!
//! Defaults live in code; every knob can be overridden from the
//! environment. The `_EVAL` variants of the risk limits apply when
//! evaluation mode is on.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use argus_core::Timeframe;
use argus_feed::FeedConfig;
use argus_risk_manager::GateConfig;
use argus_strategy::ScorerConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Full runner configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Instrument symbol, also used for feed subscription
    pub instrument: String,
    pub feed: FeedConfig,
    /// Momentum/oscillator timeframe
    pub lower_timeframe: Timeframe,
    /// Trend/volatility timeframe
    pub higher_timeframe: Timeframe,
    pub scorer: ScorerConfig,
    pub gate: GateConfig,
    /// Spread ceiling for signal generation, in pips
    pub max_spread_pips: Decimal,
    /// Evaluation loop cadence
    pub eval_interval: Duration,
    /// Health/rollover loop cadence
    pub health_interval: Duration,
    /// Feed delay that triggers a health warning
    pub alert_delay_threshold: Duration,
    /// Tick buffer retention
    pub tick_retention: Duration,
    /// How often the buffer is pruned
    pub prune_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument: "XAU-USD".to_string(),
            feed: FeedConfig::default(),
            lower_timeframe: Timeframe::new("1M"),
            higher_timeframe: Timeframe::new("5M"),
            scorer: ScorerConfig::default(),
            gate: GateConfig::default(),
            max_spread_pips: dec!(5),
            eval_interval: Duration::from_millis(100),
            health_interval: Duration::from_secs(60),
            alert_delay_threshold: Duration::from_secs(5),
            tick_retention: Duration::from_secs(300),
            prune_interval: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.instrument = env_or("INSTRUMENT", config.instrument);
        config.feed.url = env_or("WS_URL", config.feed.url);
        config.feed.instrument = config.instrument.clone();

        config.lower_timeframe = Timeframe::new(env_or("LOWER_TIMEFRAME", "1M".to_string()));
        config.higher_timeframe = Timeframe::new(env_or("HIGHER_TIMEFRAME", "5M".to_string()));

        config.scorer.ema_fast = env_parse("EMA_PERIODS_FAST", config.scorer.ema_fast);
        config.scorer.ema_medium = env_parse("EMA_PERIODS_MED", config.scorer.ema_medium);
        config.scorer.ema_slow = env_parse("EMA_PERIODS_SLOW", config.scorer.ema_slow);
        config.scorer.rsi_period = env_parse("RSI_PERIOD", config.scorer.rsi_period);
        config.scorer.stoch_k_period = env_parse("STOCH_K_PERIOD", config.scorer.stoch_k_period);
        config.scorer.stoch_d_period = env_parse("STOCH_D_PERIOD", config.scorer.stoch_d_period);
        config.scorer.atr_period = env_parse("ATR_PERIOD", config.scorer.atr_period);
        config.scorer.pip_size = env_parse("PIP_SIZE", config.scorer.pip_size);
        config.scorer.default_sl_pips = env_parse("DEFAULT_SL_PIPS", config.scorer.default_sl_pips);
        config.scorer.atr_multiplier = env_parse("SL_ATR_MULTIPLIER", config.scorer.atr_multiplier);
        config.scorer.reward_risk_ratio = env_parse("TP_RR_RATIO", config.scorer.reward_risk_ratio);

        config.max_spread_pips = env_parse("MAX_SPREAD_PIPS", config.max_spread_pips);

        let evaluation_mode = env_parse("EVALUATION_MODE", false);
        config.gate.evaluation_mode = evaluation_mode;
        config.gate.max_feed_delay =
            Duration::from_secs_f64(env_parse("MAX_TICK_DELAY_SECONDS", 3.0));
        config.gate.max_trades_per_day =
            env_parse("MAX_TRADES_PER_DAY", config.gate.max_trades_per_day);
        config.gate.virtual_balance = env_parse("VIRTUAL_BALANCE", config.gate.virtual_balance);

        // Relaxed limits in evaluation mode, production limits otherwise
        if evaluation_mode {
            config.gate.daily_loss_limit_pct = env_parse("DAILY_LOSS_PERCENT_EVAL", dec!(5));
            config.gate.cooldown =
                Duration::from_secs_f64(env_parse("SIGNAL_COOLDOWN_SECONDS_EVAL", 60.0));
            config.gate.min_confidence = env_confidence("MIN_SIGNAL_CONFIDENCE_EVAL", 60);
        } else {
            config.gate.daily_loss_limit_pct = env_parse("DAILY_LOSS_PERCENT", dec!(3));
            config.gate.cooldown =
                Duration::from_secs_f64(env_parse("SIGNAL_COOLDOWN_SECONDS", 180.0));
            config.gate.min_confidence = env_confidence("MIN_SIGNAL_CONFIDENCE", 70);
        }

        config
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Confidence values are written as percentages, possibly fractional
fn env_confidence(key: &str, default: u8) -> u8 {
    let value: f64 = env_parse(key, default as f64);
    value.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_production_settings() {
        let config = AppConfig::default();
        assert_eq!(config.lower_timeframe.bucket_secs(), 60);
        assert_eq!(config.higher_timeframe.bucket_secs(), 300);
        assert_eq!(config.max_spread_pips, dec!(5));
        assert!(!config.gate.evaluation_mode);
        assert_eq!(config.gate.min_confidence, 70);
        assert_eq!(config.eval_interval, Duration::from_millis(100));
    }
}
