use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::backoff::Backoff;
use crate::error::FeedError;
use crate::state::{FeedHandle, FeedStatus};

/// Feed connection configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Streaming endpoint URL
    pub url: String,
    /// Instrument symbol to subscribe to
    pub instrument: String,
    /// First reconnect delay
    pub initial_backoff: Duration,
    /// Reconnect delay cap
    pub max_backoff: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://quotes.example.com/realtime".to_string(),
            instrument: "XAU-USD".to_string(),
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
        }
    }
}

/// Subscription request sent on every successful connect
#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    pairs: [&'a str; 1],
}

/// Inbound wire messages; anything but a tick is ignored
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FeedMessage {
    Tick {
        pair: String,
        bid: Decimal,
        ask: Decimal,
    },
    #[serde(other)]
    Other,
}

/// How a feed session ended
enum SessionEnd {
    /// Shutdown requested; do not reconnect
    Shutdown,
    /// Remote close or stream error; reconnect under backoff
    Disconnected,
}

/// Long-lived quote stream ingestion task
///
/// Owns the socket. Runs until the shutdown signal flips; connection loss is
/// handled with unbounded exponential-backoff retries. All observable state
/// goes through the [`FeedHandle`].
pub struct FeedConnection {
    config: FeedConfig,
    handle: FeedHandle,
    shutdown: watch::Receiver<bool>,
}

impl FeedConnection {
    pub fn new(config: FeedConfig, handle: FeedHandle, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            config,
            handle,
            shutdown,
        }
    }

    /// Run the ingestion loop to completion
    pub async fn run(mut self) {
        let mut backoff = Backoff::new(self.config.initial_backoff, self.config.max_backoff);
        log::info!("[Feed] Ingestion task started for {}", self.config.instrument);

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            match self.run_session(&mut backoff).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Disconnected) => {}
                Err(e) => log::error!("[Feed] Session error: {}", e),
            }

            self.handle.set_status(FeedStatus::Disconnected).await;
            self.handle.record_reconnect();

            let delay = backoff.next_delay();
            log::warn!("[Feed] Reconnecting in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        self.handle.set_status(FeedStatus::Disconnected).await;
        log::info!("[Feed] Ingestion task stopped");
    }

    /// One connect-subscribe-read session
    async fn run_session(&mut self, backoff: &mut Backoff) -> Result<SessionEnd, FeedError> {
        self.handle.set_status(FeedStatus::Connecting).await;
        log::info!("[Feed] Connecting to {}", self.config.url);

        let (stream, _) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = stream.split();

        let request = SubscribeRequest {
            kind: "subscribe",
            pairs: [self.config.instrument.as_str()],
        };
        let payload =
            serde_json::to_string(&request).map_err(|e| FeedError::Subscribe(e.to_string()))?;
        write
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| FeedError::Subscribe(e.to_string()))?;

        self.handle.set_status(FeedStatus::Connected).await;
        backoff.reset();
        log::info!("[Feed] Connected, subscribed to {}", self.config.instrument);

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        return Ok(SessionEnd::Shutdown);
                    }
                }
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text).await,
                    Some(Ok(Message::Close(frame))) => {
                        log::warn!("[Feed] Server closed connection: {:?}", frame);
                        return Ok(SessionEnd::Disconnected);
                    }
                    Some(Ok(_)) => {} // ping/pong/binary, nothing to do
                    Some(Err(e)) => {
                        log::error!("[Feed] Stream error: {}", e);
                        return Ok(SessionEnd::Disconnected);
                    }
                    None => {
                        log::warn!("[Feed] Stream ended");
                        return Ok(SessionEnd::Disconnected);
                    }
                },
            }
        }
    }

    /// Parse one text frame; malformed or foreign messages are dropped
    async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<FeedMessage>(text) {
            Ok(FeedMessage::Tick { pair, bid, ask }) if pair == self.config.instrument => {
                self.handle.apply_tick(bid, ask, Utc::now()).await;
                log::debug!("[Feed] Tick: bid={} ask={}", bid, ask);
            }
            Ok(_) => log::debug!("[Feed] Ignoring unrelated message"),
            Err(e) => log::debug!("[Feed] Dropping unparseable message: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_subscribe_request_shape() {
        let request = SubscribeRequest {
            kind: "subscribe",
            pairs: ["XAU-USD"],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"type":"subscribe","pairs":["XAU-USD"]}"#);
    }

    #[test]
    fn test_tick_message_parses() {
        let text = r#"{"type":"tick","pair":"XAU-USD","bid":2400.1,"ask":2400.35}"#;
        match serde_json::from_str::<FeedMessage>(text).unwrap() {
            FeedMessage::Tick { pair, bid, ask } => {
                assert_eq!(pair, "XAU-USD");
                assert_eq!(bid, dec!(2400.1));
                assert_eq!(ask, dec!(2400.35));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_message_types_are_tolerated() {
        let text = r#"{"type":"heartbeat","seq":42}"#;
        assert!(matches!(
            serde_json::from_str::<FeedMessage>(text),
            Ok(FeedMessage::Other)
        ));
    }
}
