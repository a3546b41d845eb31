//! Argus Feed
//!
//! Live quote ingestion for the Argus signal sentinel:
//! - WebSocket connection with subscribe-on-connect
//! - Unbounded reconnect under exponential backoff (5s doubling to 60s)
//! - Shared link state exposing the latest quote, delay and tick rate
//!
//! The ingestion task is the only component that touches the network; the
//! evaluation loop only ever reads [`FeedHandle`] snapshots.

pub mod backoff;
pub mod connection;
pub mod error;
pub mod state;

// Re-export main types
pub use backoff::Backoff;
pub use connection::{FeedConfig, FeedConnection};
pub use error::FeedError;
pub use state::{FeedHandle, FeedSnapshot, FeedStatus, Quote};
