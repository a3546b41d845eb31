//! Argus Runner
//!
//! Orchestration for the signal sentinel. Three long-lived tasks share two
//! pieces of state:
//!
//! ```text
//! Feed (WebSocket) ──► FeedHandle ──► Engine (100ms evaluation loop)
//!                          │              │ aggregate -> score -> gate
//!                          │              ▼
//!                          │          RiskState ──► TradeStore / Notifier
//!                          │              ▲
//!                          └──── HealthMonitor (status + day rollover)
//! ```
//!
//! Shutdown is a watch signal: the engine finishes its current cycle, then
//! the final risk snapshot is handed to the store.

pub mod config;
pub mod engine;
pub mod health;
pub mod notify;
pub mod store;

// Re-export main types
pub use config::AppConfig;
pub use engine::{CycleOutcome, Engine, EngineConfig, EngineError};
pub use health::{HealthConfig, HealthMonitor};
pub use notify::LogNotifier;
pub use store::MemoryStore;
