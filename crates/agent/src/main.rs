//! Pod Monitor - namespace health monitoring agent
//!
//! Polls one namespace for pod health, classifies failures from status
//! fields and recent log lines, and reconciles the observations into the
//! store the dashboard reads.

use anyhow::Result;
use podmon_lib::{
    collector::{KubePodSource, LogWindow, PollLoopBuilder},
    health::{components, HealthRegistry},
    observability::{AgentMetrics, StructuredLogger},
    reconcile::{MemoryStore, Reconciler, ReconcilerConfig, RoutingTable},
    relay::{HttpRelay, UpdateSink},
    snapshot::SnapshotBuilder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting podmon-agent");

    let config = config::AgentConfig::load()?;
    info!(namespace = %config.namespace, "Agent configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::COLLECTOR).await;
    health_registry.register(components::RELAY).await;
    health_registry.register(components::STORE).await;

    let metrics = AgentMetrics::new();
    let logger = StructuredLogger::new(&config.namespace);

    // The store backs the read projections in both modes; the embedded
    // reconciler is only wired as the sink when no backend is configured.
    let store = Arc::new(MemoryStore::new());

    let (sink, sink_mode): (Arc<dyn UpdateSink>, &str) = match &config.backend_endpoint {
        Some(endpoint) => {
            let relay =
                HttpRelay::new(endpoint, Duration::from_secs(config.relay_timeout_secs))?;
            (Arc::new(relay), "remote")
        }
        None => {
            health_registry.register(components::RECONCILER).await;
            let reconciler = Reconciler::new(
                store.clone(),
                ReconcilerConfig {
                    dedup_window: Duration::from_secs(config.dedup_window_secs),
                    max_errors_per_pod_per_cycle: config.max_errors_per_pod,
                    routing: RoutingTable::standard(),
                },
            );
            (Arc::new(reconciler), "embedded")
        }
    };

    logger.log_startup(AGENT_VERSION, sink_mode);

    let source = Arc::new(
        KubePodSource::from_default_config(
            config.namespace.clone(),
            LogWindow {
                tail_lines: config.log_tail_lines,
                since_seconds: config.log_since_seconds,
            },
        )
        .await?,
    );

    let poll_loop = PollLoopBuilder::new()
        .source(source)
        .snapshot_builder(SnapshotBuilder::new(config.classifier_mode, config.log_fetch))
        .sink(sink)
        .interval(Duration::from_secs(config.poll_interval_secs))
        .health(health_registry.clone())
        .metrics(metrics.clone())
        .logger(logger.clone())
        .build()?;

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics.clone(),
        store,
    ));

    // Mark agent as ready after initialization
    health_registry.set_ready(true).await;

    // Start health/metrics/projection server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let loop_handle = tokio::spawn(poll_loop.run(shutdown_rx));

    // Wait for shutdown signal; the in-flight cycle finishes before exit
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    let _ = shutdown_tx.send(());
    loop_handle.await?;
    api_handle.abort();

    Ok(())
}
