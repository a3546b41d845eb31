//! Error types for the feed crate

use thiserror::Error;

/// Transport-level failures of one feed session
///
/// A session error is never fatal to the ingestion task: the connection loop
/// logs it and retries under backoff.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Subscribe failed: {0}")]
    Subscribe(String),
}
