//! Argus Core Domain
//!
//! Pure domain types for the Argus signal sentinel.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod candle;
pub mod decision;
pub mod tick;
pub mod timeframe;

// Re-export commonly used types at crate root
pub use candle::{Candle, CandleSeries, DEFAULT_SERIES_CAP, SeriesUpdate};
pub use decision::{Direction, SignalDecision};
pub use tick::Tick;
pub use timeframe::Timeframe;
