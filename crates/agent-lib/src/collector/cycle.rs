//! Polling cycle driver
//!
//! Implements one collection cycle (enumerate, snapshot, hand off) and the
//! fixed-interval loop that schedules cycles until shutdown. Cycles run
//! strictly sequentially: the in-flight cycle completes before the next
//! tick is honored, and ticks missed while a cycle overruns are skipped.

use super::{PodSource, SourceError};
use crate::health::{components, HealthRegistry};
use crate::models::CycleUpdate;
use crate::observability::{AgentMetrics, StructuredLogger};
use crate::relay::{RelayError, UpdateSink};
use crate::snapshot::SnapshotBuilder;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed interval between cycles (first cycle runs immediately)
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Failures that abort a cycle. Per-pod log failures never reach this
/// level; they degrade to an empty candidate list for that pod.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("pod enumeration failed: {0}")]
    Enumeration(#[source] SourceError),
    #[error("persistence hand-off failed: {0}")]
    Relay(#[source] RelayError),
}

/// What one cycle observed and delivered
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleOutcome {
    pub pods: usize,
    pub erroring: usize,
    pub candidates: usize,
    /// True when enumeration proved the namespace gone and the deletion
    /// signal was delivered instead of a pod set
    pub namespace_deleted: bool,
}

/// Run one full collection cycle.
///
/// Pods are processed and reported in enumeration order, one log round
/// trip per pod. The full (possibly empty) pod set is handed to the sink;
/// an empty set is the namespace-deletion signal, not "nothing to report".
pub async fn run_cycle(
    source: &dyn PodSource,
    builder: &SnapshotBuilder,
    sink: &dyn UpdateSink,
) -> Result<CycleOutcome, CycleError> {
    let namespace = source.namespace();

    let pods = match source.list_pods().await {
        Ok(pods) => pods,
        Err(SourceError::NamespaceNotFound) => {
            info!(namespace = %namespace, "Namespace no longer exists, delivering deletion signal");
            sink.namespace_deleted(namespace)
                .await
                .map_err(CycleError::Relay)?;
            return Ok(CycleOutcome {
                namespace_deleted: true,
                ..Default::default()
            });
        }
        Err(e) => return Err(CycleError::Enumeration(e)),
    };

    let mut outcome = CycleOutcome {
        pods: pods.len(),
        ..Default::default()
    };
    let mut observations = Vec::with_capacity(pods.len());

    for pod in &pods {
        let status = builder.classify(pod);

        let logs = if builder.wants_logs(&status) {
            match source.pod_logs(&pod.name).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(
                        namespace = %namespace,
                        pod = %pod.name,
                        error = %e,
                        "Could not fetch logs, continuing without them"
                    );
                    None
                }
            }
        } else {
            None
        };

        if status.is_error {
            outcome.erroring += 1;
        }

        let observation = builder.observe(pod, status, logs.as_deref());
        outcome.candidates += observation.errors.len();
        observations.push(observation);
    }

    let update = CycleUpdate {
        namespace: namespace.to_string(),
        pods: observations,
    };
    sink.apply_update(update).await.map_err(CycleError::Relay)?;

    Ok(outcome)
}

/// Fixed-interval polling loop driving one namespace
pub struct PollLoop {
    source: Arc<dyn PodSource>,
    builder: SnapshotBuilder,
    sink: Arc<dyn UpdateSink>,
    config: PollConfig,
    health: HealthRegistry,
    metrics: AgentMetrics,
    logger: StructuredLogger,
}

impl PollLoop {
    /// Run until the shutdown signal fires. An in-flight cycle finishes
    /// before the loop exits; no partial-write rollback is attempted.
    pub async fn run(self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        info!(
            namespace = %self.source.namespace(),
            interval_secs = self.config.interval.as_secs(),
            "Starting poll loop"
        );

        // The first tick completes immediately, giving the immediate
        // first run at startup.
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    self.run_one().await;
                    let elapsed = start.elapsed();
                    self.metrics.observe_cycle_latency(elapsed.as_secs_f64());

                    if elapsed > self.config.interval {
                        self.metrics.inc_poll_overruns();
                        warn!(
                            namespace = %self.source.namespace(),
                            elapsed_ms = elapsed.as_millis() as u64,
                            interval_ms = self.config.interval.as_millis() as u64,
                            "Cycle overran the poll interval, missed ticks will be skipped"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    info!(namespace = %self.source.namespace(), "Shutting down poll loop");
                    break;
                }
            }
        }
    }

    async fn run_one(&self) {
        self.metrics.inc_cycles();

        match run_cycle(self.source.as_ref(), &self.builder, self.sink.as_ref()).await {
            Ok(outcome) => {
                self.health.set_healthy(components::COLLECTOR).await;
                self.health.set_healthy(components::RELAY).await;

                if outcome.namespace_deleted {
                    self.logger.log_namespace_deleted();
                } else {
                    self.metrics.set_pods_observed(outcome.pods as i64);
                    self.metrics.set_error_pods(outcome.erroring as i64);
                    self.metrics.inc_candidates(outcome.candidates as u64);
                    self.logger.log_cycle_complete(
                        outcome.pods,
                        outcome.erroring,
                        outcome.candidates,
                    );
                }
            }
            Err(CycleError::Enumeration(e)) => {
                // Observations are dropped, not queued; the next successful
                // cycle supersedes this one.
                self.metrics.inc_cycle_failures();
                self.health
                    .set_degraded(components::COLLECTOR, e.to_string())
                    .await;
                warn!(
                    namespace = %self.source.namespace(),
                    error = %e,
                    "Cycle aborted, will retry next tick"
                );
            }
            Err(CycleError::Relay(e)) => {
                self.metrics.inc_cycle_failures();
                self.metrics.inc_relay_failures();
                self.health
                    .set_degraded(components::RELAY, e.to_string())
                    .await;
                self.logger.log_relay_failure(&e);
            }
        }
    }
}

/// Builder for the polling loop
pub struct PollLoopBuilder {
    source: Option<Arc<dyn PodSource>>,
    builder: Option<SnapshotBuilder>,
    sink: Option<Arc<dyn UpdateSink>>,
    config: PollConfig,
    health: Option<HealthRegistry>,
    metrics: Option<AgentMetrics>,
    logger: Option<StructuredLogger>,
}

impl PollLoopBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            builder: None,
            sink: None,
            config: PollConfig::default(),
            health: None,
            metrics: None,
            logger: None,
        }
    }

    pub fn source(mut self, source: Arc<dyn PodSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn snapshot_builder(mut self, builder: SnapshotBuilder) -> Self {
        self.builder = Some(builder);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn UpdateSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn metrics(mut self, metrics: AgentMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<PollLoop> {
        let source = self
            .source
            .ok_or_else(|| anyhow::anyhow!("source is required"))?;
        let builder = self
            .builder
            .ok_or_else(|| anyhow::anyhow!("snapshot builder is required"))?;
        let sink = self.sink.ok_or_else(|| anyhow::anyhow!("sink is required"))?;
        let namespace = source.namespace().to_string();

        Ok(PollLoop {
            source,
            builder,
            sink,
            config: self.config,
            health: self.health.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            logger: self.logger.unwrap_or_else(|| StructuredLogger::new(namespace)),
        })
    }
}

impl Default for PollLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
