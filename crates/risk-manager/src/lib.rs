//! Argus Risk Manager
//!
//! Admission control between a scored signal and its emission:
//!
//! - **RiskState**: per-day counters (trade count, realized P&L, cooldown
//!   anchor, pause flag), monotonic within a day, reset as a unit at rollover
//! - **RiskGate**: ordered, short-circuiting checks, one typed reason per
//!   failing check
//!
//! The gate only ever reads; callers mutate the state on acceptance while
//! holding its lock, so a decision is atomic with respect to day rollover.

pub mod gate;
pub mod state;

// Re-export main types
pub use gate::{GateConfig, RejectReason, RiskGate};
pub use state::{RiskState, RiskStatus};
