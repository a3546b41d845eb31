use argus_core::SignalDecision;
use async_trait::async_trait;
use thiserror::Error;

/// Notification delivery failures
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Notification collaborator contract
///
/// Receives each accepted decision exactly once. Delivery is advisory;
/// a failed notification does not retract the decision.
#[async_trait]
pub trait SignalNotifier: Send + Sync {
    async fn notify(&self, decision: &SignalDecision) -> Result<(), NotifyError>;
}
