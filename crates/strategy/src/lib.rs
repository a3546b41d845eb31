//! Argus Strategy
//!
//! The tick-to-score middle of the pipeline:
//! - `TickAggregator` buckets raw quotes into OHLCV candles per timeframe
//!   and maintains the bounded candle history
//! - `indicators` holds the EMA / RSI / Stochastic / ATR math
//! - `SignalScorer` folds indicator outcomes into a weighted directional
//!   confidence score and derives stop levels
//!
//! Everything here is synchronous and side-effect free apart from the
//! aggregator's own buffers; the runner owns scheduling and state.

pub mod aggregator;
pub mod indicators;
pub mod scorer;

// Re-export main types
pub use aggregator::TickAggregator;
pub use scorer::{ScoredSignal, ScorerConfig, SignalScorer, StopLevels};
