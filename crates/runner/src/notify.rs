//! Log-backed notifier
//!
//! Reference implementation of the notification contract: renders each
//! accepted decision through the logger. The production consumer (chat bot,
//! webhook, queue) plugs in behind the same trait.

use argus_core::SignalDecision;
use argus_ports::{NotifyError, SignalNotifier};
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignalNotifier for LogNotifier {
    async fn notify(&self, decision: &SignalDecision) -> Result<(), NotifyError> {
        log::info!(
            "[Signal] {} {} @ {} | SL {} TP {} | confidence {}% | spread {} pips, delay {:.2}s | risk {}p reward {}p",
            decision.direction,
            decision.instrument,
            decision.entry,
            decision.stop_loss,
            decision.take_profit,
            decision.confidence,
            decision.spread_pips,
            decision.feed_delay.as_secs_f64(),
            decision.risk_pips,
            decision.reward_pips,
        );
        Ok(())
    }
}
