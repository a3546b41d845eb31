//! Argus binary - wires the feed, engine and health loop together

use std::sync::Arc;

use argus_feed::{FeedConnection, FeedHandle};
use argus_ports::{SignalNotifier, TradeStore};
use argus_risk_manager::{RiskGate, RiskState};
use argus_runner::{
    AppConfig, Engine, EngineConfig, HealthConfig, HealthMonitor, LogNotifier, MemoryStore,
};
use argus_strategy::SignalScorer;
use chrono::Utc;
use tokio::sync::{RwLock, watch};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!("==================================================");
    log::info!("Argus signal sentinel starting");
    log::info!(
        "Instrument {} | timeframes {} / {} | mode {}",
        config.instrument,
        config.lower_timeframe,
        config.higher_timeframe,
        if config.gate.evaluation_mode {
            "EVALUATION"
        } else {
            "PRODUCTION"
        }
    );
    log::info!("==================================================");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let feed = FeedHandle::new(Utc::now());
    let connection = FeedConnection::new(config.feed.clone(), feed.clone(), shutdown_rx.clone());
    let feed_task = tokio::spawn(connection.run());

    let risk = Arc::new(RwLock::new(RiskState::new(Utc::now().date_naive())));
    let trade_store: Arc<dyn TradeStore> = Arc::new(MemoryStore::new());
    let notifier: Arc<dyn SignalNotifier> = Arc::new(LogNotifier::new());

    let engine = Engine::new(
        EngineConfig {
            instrument: config.instrument.clone(),
            lower_timeframe: config.lower_timeframe.clone(),
            higher_timeframe: config.higher_timeframe.clone(),
            max_spread_pips: config.max_spread_pips,
            eval_interval: config.eval_interval,
            tick_retention: config.tick_retention,
            prune_interval: config.prune_interval,
            evaluation_mode: config.gate.evaluation_mode,
        },
        feed.clone(),
        SignalScorer::new(config.scorer.clone()),
        RiskGate::new(config.gate.clone()),
        risk.clone(),
        trade_store.clone(),
        notifier,
    );
    let engine_task = tokio::spawn(engine.run(shutdown_rx.clone()));

    let health = HealthMonitor::new(
        HealthConfig {
            interval: config.health_interval,
            alert_delay_threshold: config.alert_delay_threshold,
            virtual_balance: config.gate.virtual_balance,
        },
        feed.clone(),
        risk.clone(),
        trade_store.clone(),
    );
    let health_task = tokio::spawn(health.run(shutdown_rx));

    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown requested"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
    }
    let _ = shutdown_tx.send(true);

    // Let the evaluation loop finish its current cycle before snapshotting
    if let Err(e) = engine_task.await {
        log::error!("Engine task failed: {}", e);
    }

    let status = risk.read().await.status();
    match serde_json::to_string(&status) {
        Ok(json) => {
            if let Err(e) = trade_store.set_state("risk_state", json).await {
                log::error!("Failed to persist final risk state: {}", e);
            }
        }
        Err(e) => log::error!("Failed to serialize final risk state: {}", e),
    }

    let _ = tokio::join!(feed_task, health_task);
    log::info!("Shutdown complete");
}
