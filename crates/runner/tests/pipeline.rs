//! End-to-end pipeline test: synthetic ticks through aggregation, scoring,
//! gating and emission, against the in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use argus_core::{Direction, SignalDecision, Timeframe};
use argus_feed::{FeedHandle, FeedStatus};
use argus_ports::{NotifyError, SignalNotifier, TradeStore};
use argus_risk_manager::{GateConfig, RejectReason, RiskGate, RiskState};
use argus_runner::{CycleOutcome, Engine, EngineConfig, MemoryStore};
use argus_strategy::{ScorerConfig, SignalScorer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{Mutex, RwLock};

/// Notifier stub that records every delivered decision
#[derive(Default)]
struct CaptureNotifier {
    sent: Mutex<Vec<SignalDecision>>,
}

#[async_trait]
impl SignalNotifier for CaptureNotifier {
    async fn notify(&self, decision: &SignalDecision) -> Result<(), NotifyError> {
        self.sent.lock().await.push(decision.clone());
        Ok(())
    }
}

fn engine_config() -> EngineConfig {
    EngineConfig {
        instrument: "XAU-USD".to_string(),
        lower_timeframe: Timeframe::new("1M"),
        higher_timeframe: Timeframe::new("5M"),
        max_spread_pips: dec!(5),
        eval_interval: Duration::from_millis(100),
        tick_retention: Duration::from_secs(300),
        prune_interval: Duration::from_secs(300),
        evaluation_mode: false,
    }
}

#[tokio::test]
async fn test_pipeline_emits_and_exhausts_daily_quota() {
    // Aligned to a 5-minute boundary so candle buckets line up with ticks
    let t0: DateTime<Utc> = DateTime::from_timestamp(1_700_000_400, 0).unwrap();

    let feed = FeedHandle::new(t0);
    let risk = Arc::new(RwLock::new(RiskState::new(t0.date_naive())));
    let store = Arc::new(MemoryStore::new());
    let trade_store: Arc<dyn TradeStore> = store.clone();
    let notifier = Arc::new(CaptureNotifier::default());
    let signal_notifier: Arc<dyn SignalNotifier> = notifier.clone();

    // Default gate except the confidence floor: the steady-trend scenario
    // scores 50, below the production default of 70
    let gate = RiskGate::new(GateConfig {
        min_confidence: 40,
        ..Default::default()
    });

    let mut engine = Engine::new(
        engine_config(),
        feed.clone(),
        SignalScorer::new(ScorerConfig::default()),
        gate,
        risk.clone(),
        trade_store.clone(),
        signal_notifier,
    );

    // Nothing flows before the feed is connected and quoting
    assert_eq!(
        engine.run_cycle(t0).await.unwrap(),
        CycleOutcome::FeedUnavailable
    );
    feed.set_status(FeedStatus::Connected).await;
    assert_eq!(
        engine.run_cycle(t0).await.unwrap(),
        CycleOutcome::FeedUnavailable
    );

    // Steady uptrend, one tick per minute, 2-pip spread
    let mut outcomes = Vec::new();
    for i in 0..130i64 {
        let now = t0 + chrono::Duration::seconds(i * 60);
        let bid = dec!(2000) + dec!(0.5) * Decimal::from(i);
        feed.apply_tick(bid, bid + dec!(0.02), now).await;
        outcomes.push(engine.run_cycle(now).await.unwrap());
    }

    // One candle per series is not enough history
    assert_eq!(outcomes[0], CycleOutcome::AwaitingData);
    // Enough candles but the slow EMA is not ready yet
    assert_eq!(outcomes[30], CycleOutcome::NoSignal);
    // The slow EMA needs 20 five-minute candles: first emission at minute 95
    assert!(matches!(outcomes[95], CycleOutcome::Emitted(_)));

    // Cooldown spaces emissions 3 minutes apart until the daily cap of 5
    let emitted = outcomes
        .iter()
        .filter(|o| matches!(o, CycleOutcome::Emitted(_)))
        .count();
    assert_eq!(emitted, 5);
    assert!(
        outcomes
            .iter()
            .any(|o| matches!(o, CycleOutcome::Rejected(RejectReason::Cooldown { .. })))
    );
    assert!(
        outcomes
            .iter()
            .any(|o| matches!(o, CycleOutcome::Rejected(RejectReason::MaxTrades { .. })))
    );

    // Every emission reached the notifier, in order
    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 5);

    let first = &sent[0];
    assert_eq!(first.direction, Direction::Buy);
    assert_eq!(first.confidence, 50);
    // BUY enters at the ask of minute 95
    assert_eq!(first.entry, dec!(2047.52));
    assert_eq!(first.spread_pips, dec!(2));
    assert!(first.stop_loss < first.entry);
    assert!(first.take_profit > first.entry);
    assert!(first.risk_pips > dec!(0));
    // Reward distance is the stop distance scaled by the reward:risk ratio
    assert!((first.reward_pips - first.risk_pips * dec!(1.8)).abs() < dec!(0.001));

    // Every emission was persisted; the store returns newest first
    let trades = trade_store.recent_trades(10).await.unwrap();
    assert_eq!(trades.len(), 5);
    assert_eq!(trades[0].signal_id, sent[4].id);
    assert!(trades.iter().all(|t| !t.evaluation_mode));

    assert_eq!(risk.read().await.trades_today(), 5);
}

#[tokio::test]
async fn test_wide_spread_suppresses_signals() {
    let t0: DateTime<Utc> = DateTime::from_timestamp(1_700_000_400, 0).unwrap();

    let feed = FeedHandle::new(t0);
    let risk = Arc::new(RwLock::new(RiskState::new(t0.date_naive())));
    let trade_store: Arc<dyn TradeStore> = Arc::new(MemoryStore::new());
    let notifier = Arc::new(CaptureNotifier::default());
    let signal_notifier: Arc<dyn SignalNotifier> = notifier.clone();

    let mut engine = Engine::new(
        engine_config(),
        feed.clone(),
        SignalScorer::new(ScorerConfig::default()),
        RiskGate::new(GateConfig {
            min_confidence: 40,
            ..Default::default()
        }),
        risk.clone(),
        trade_store,
        signal_notifier,
    );

    feed.set_status(FeedStatus::Connected).await;

    // Same uptrend, but a 6-pip spread against the 5-pip ceiling
    for i in 0..130i64 {
        let now = t0 + chrono::Duration::seconds(i * 60);
        let bid = dec!(2000) + dec!(0.5) * Decimal::from(i);
        feed.apply_tick(bid, bid + dec!(0.06), now).await;
        let outcome = engine.run_cycle(now).await.unwrap();
        assert!(
            !matches!(outcome, CycleOutcome::Emitted(_)),
            "cycle {} emitted through a wide spread",
            i
        );
    }

    assert!(notifier.sent.lock().await.is_empty());
    assert_eq!(risk.read().await.trades_today(), 0);
}
