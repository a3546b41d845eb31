//! Evaluation Engine
//!
//! The fixed-interval loop at the center of the pipeline. Each cycle samples
//! the current quote as a tick, refreshes the candle caches, scores the
//! indicator stack and pushes any candidate through the risk gate. The
//! decision block (gate check, trade persistence, state mutation) runs under
//! the risk-state write lock, so day rollover can never land inside it.

use std::sync::Arc;
use std::time::Duration;

use argus_core::{SeriesUpdate, SignalDecision, Timeframe};
use argus_feed::{FeedHandle, FeedStatus};
use argus_ports::{NotifyError, SignalNotifier, StoreError, TradeRecord, TradeStore};
use argus_risk_manager::{RejectReason, RiskGate, RiskState};
use argus_strategy::{SignalScorer, TickAggregator};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub instrument: String,
    pub lower_timeframe: Timeframe,
    pub higher_timeframe: Timeframe,
    pub max_spread_pips: Decimal,
    pub eval_interval: Duration,
    pub tick_retention: Duration,
    pub prune_interval: Duration,
    /// Stamped onto trade records
    pub evaluation_mode: bool,
}

/// Collaborator failures inside a cycle; logged, never fatal to the loop
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// What one evaluation cycle amounted to
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Feed not connected or no quote seen yet
    FeedUnavailable,
    /// Not enough candle history to score
    AwaitingData,
    /// Indicators did not line up (or the spread filter fired)
    NoSignal,
    /// Scored signal blocked by the risk gate
    Rejected(RejectReason),
    /// Decision emitted downstream
    Emitted(Uuid),
}

/// The tick-to-decision evaluation loop
pub struct Engine {
    config: EngineConfig,
    feed: FeedHandle,
    aggregator: TickAggregator,
    scorer: SignalScorer,
    gate: RiskGate,
    risk: Arc<RwLock<RiskState>>,
    store: Arc<dyn TradeStore>,
    notifier: Arc<dyn SignalNotifier>,
    last_prune: Option<DateTime<Utc>>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        feed: FeedHandle,
        scorer: SignalScorer,
        gate: RiskGate,
        risk: Arc<RwLock<RiskState>>,
        store: Arc<dyn TradeStore>,
        notifier: Arc<dyn SignalNotifier>,
    ) -> Self {
        Self {
            config,
            feed,
            aggregator: TickAggregator::new(),
            scorer,
            gate,
            risk,
            store,
            notifier,
            last_prune: None,
        }
    }

    /// Run the loop until the shutdown signal flips
    ///
    /// The current cycle always completes before the loop exits; cycle
    /// errors are logged and followed by a short pause.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "[Engine] Evaluation loop started ({:?} interval, {} / {})",
            self.config.eval_interval,
            self.config.lower_timeframe,
            self.config.higher_timeframe
        );

        let mut interval = tokio::time::interval(self.config.eval_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_cycle(Utc::now()).await {
                        Ok(outcome) => log::trace!("[Engine] Cycle outcome: {:?}", outcome),
                        Err(e) => {
                            log::error!("[Engine] Cycle failed: {}", e);
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("[Engine] Evaluation loop stopped");
    }

    /// One evaluation cycle at the given instant
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome, EngineError> {
        let snapshot = self.feed.snapshot().await;
        if snapshot.status != FeedStatus::Connected {
            return Ok(CycleOutcome::FeedUnavailable);
        }
        let Some(quote) = snapshot.quote else {
            return Ok(CycleOutcome::FeedUnavailable);
        };

        // Sample the current quote into the buffer and refresh both caches
        self.aggregator.add_tick(quote.bid, quote.ask, now);
        for timeframe in [
            self.config.lower_timeframe.clone(),
            self.config.higher_timeframe.clone(),
        ] {
            if let Some(candle) = self.aggregator.aggregate(&timeframe)
                && self.aggregator.update_cache(candle) == SeriesUpdate::OutOfOrder
            {
                log::warn!("[Engine] Dropped out-of-order candle for {}", timeframe);
            }
        }

        let due_for_prune = self
            .last_prune
            .is_none_or(|last| (now - last).to_std().unwrap_or(Duration::ZERO) >= self.config.prune_interval);
        if due_for_prune {
            self.aggregator.prune(now, self.config.tick_retention);
            self.last_prune = Some(now);
        }

        let (lower, higher) = match (
            self.aggregator.series(&self.config.lower_timeframe),
            self.aggregator.series(&self.config.higher_timeframe),
        ) {
            (Some(lower), Some(higher)) if lower.len() >= 2 && higher.len() >= 2 => {
                (lower, higher)
            }
            _ => return Ok(CycleOutcome::AwaitingData),
        };

        let spread_pips = quote.spread_pips(self.scorer.config().pip_size);
        let Some(signal) = self
            .scorer
            .score(lower, higher, spread_pips, self.config.max_spread_pips)
        else {
            return Ok(CycleOutcome::NoSignal);
        };

        let feed_delay = snapshot.delay(now);

        // Decision block: gate, persist and mutate under one lock hold
        let mut risk = self.risk.write().await;
        if let Err(reason) = self.gate.evaluate(&risk, now, feed_delay, signal.confidence) {
            log::debug!("[Engine] Signal blocked: {}", reason);
            return Ok(CycleOutcome::Rejected(reason));
        }

        let entry = match signal.direction {
            argus_core::Direction::Buy => quote.ask,
            argus_core::Direction::Sell => quote.bid,
        };
        let atr = self.scorer.atr(higher);
        let stops = self.scorer.stops(signal.direction, entry, atr);
        let decision = SignalDecision::new(
            self.config.instrument.clone(),
            signal.direction,
            signal.confidence,
            entry,
            stops.stop_loss,
            stops.take_profit,
            spread_pips,
            feed_delay,
            self.scorer.price_to_pips((entry - stops.stop_loss).abs()),
            self.scorer.price_to_pips((stops.take_profit - entry).abs()),
            now,
        );

        self.store
            .record_trade(TradeRecord::from_decision(
                &decision,
                self.config.evaluation_mode,
            ))
            .await?;
        risk.record_signal(now);
        drop(risk);

        log::info!(
            "[Engine] Signal accepted: {} {} @ {} (confidence {}%)",
            decision.direction,
            decision.instrument,
            decision.entry,
            decision.confidence
        );
        self.notifier.notify(&decision).await?;

        Ok(CycleOutcome::Emitted(decision.id))
    }
}
