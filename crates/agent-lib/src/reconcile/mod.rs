//! Pod-state reconciliation
//!
//! Diffs each cycle's pod set against stored state and applies the
//! namespace state machine:
//!
//! 1. Empty set, namespace stored: the namespace left the cluster;
//!    cascade-delete it.
//! 2. Empty set, namespace absent: no-op.
//! 3. Non-empty set: upsert the namespace, delete pods the cluster no
//!    longer reports, upsert the rest, and persist at most
//!    `max_errors_per_pod_per_cycle` fresh, non-duplicate error candidates
//!    per pod.

mod routing;
mod store;

pub use routing::{RoutingRule, RoutingTable};
pub use store::{
    DashboardStats, ErrorRecord, MemoryStore, NamespaceRecord, PodRecord, PodSummary,
    RecentError, StoreError,
};

use crate::classify::classify_priority;
use crate::models::{CycleUpdate, IngestError};
use crate::observability::AgentMetrics;
use crate::relay::{async_trait, RelayError, UpdateSink};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Tunables for reconciliation
#[derive(Debug)]
pub struct ReconcilerConfig {
    /// Rolling lookback suppressing re-insertion of an identical error
    pub dedup_window: Duration,
    /// Capacity policy: only the head of each pod's candidate list is
    /// persisted per cycle, keeping volume bounded for noisy pods
    pub max_errors_per_pod_per_cycle: usize,
    /// AI-status seeding rules
    pub routing: RoutingTable,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_secs(60),
            max_errors_per_pod_per_cycle: 1,
            routing: RoutingTable::standard(),
        }
    }
}

/// What one reconcile pass changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub namespace_deleted: bool,
    pub pods_upserted: usize,
    pub pods_deleted: usize,
    pub errors_recorded: usize,
    pub errors_suppressed: usize,
}

/// Applies cycle updates to the store
pub struct Reconciler {
    store: Arc<MemoryStore>,
    config: ReconcilerConfig,
    metrics: AgentMetrics,
}

impl Reconciler {
    pub fn new(store: Arc<MemoryStore>, config: ReconcilerConfig) -> Self {
        Self {
            store,
            config,
            metrics: AgentMetrics::new(),
        }
    }

    pub fn with_defaults(store: Arc<MemoryStore>) -> Self {
        Self::new(store, ReconcilerConfig::default())
    }

    /// Apply one cycle's observations. Malformed payloads are rejected
    /// before any state is touched.
    pub async fn apply(&self, update: CycleUpdate) -> Result<CycleSummary, IngestError> {
        update.validate()?;

        let mut summary = CycleSummary::default();

        if update.pods.is_empty() {
            summary.namespace_deleted = self.remove_namespace(&update.namespace).await;
            return Ok(summary);
        }

        let namespace_id = self.store.upsert_namespace(&update.namespace).await;

        let incoming: HashSet<&str> = update.pods.iter().map(|p| p.name.as_str()).collect();
        for stored in self.store.pod_names(namespace_id).await {
            if !incoming.contains(stored.as_str()) {
                info!(namespace = %update.namespace, pod = %stored, "Pod left the cluster, removing");
                self.store.delete_pod(namespace_id, &stored).await;
                summary.pods_deleted += 1;
            }
        }

        for pod in &update.pods {
            let pod_id = self
                .store
                .upsert_pod(namespace_id, &pod.name, &pod.status)
                .await;
            summary.pods_upserted += 1;

            for candidate in pod
                .errors
                .iter()
                .take(self.config.max_errors_per_pod_per_cycle)
            {
                let priority = classify_priority(&candidate.message);
                let ai_status = self
                    .config
                    .routing
                    .initial_status(&pod.name, &candidate.message);

                match self
                    .store
                    .record_error_if_new(
                        pod_id,
                        candidate,
                        priority,
                        ai_status,
                        self.config.dedup_window,
                    )
                    .await
                {
                    Some(_) => {
                        summary.errors_recorded += 1;
                        self.metrics.inc_errors_recorded();
                        debug!(
                            namespace = %update.namespace,
                            pod = %pod.name,
                            error_type = %candidate.error_type,
                            priority = %priority,
                            "Recorded error"
                        );
                    }
                    None => {
                        summary.errors_suppressed += 1;
                        self.metrics.inc_errors_suppressed();
                    }
                }
            }
        }

        self.update_tracking_gauges().await;
        Ok(summary)
    }

    async fn remove_namespace(&self, name: &str) -> bool {
        let removed = self.store.delete_namespace(name).await;
        if removed {
            info!(namespace = %name, "Namespace has no pods, removed with its pods and errors");
        }
        self.update_tracking_gauges().await;
        removed
    }

    async fn update_tracking_gauges(&self) {
        let stats = self.store.stats().await;
        self.metrics
            .set_tracked(stats.total_namespaces as i64, stats.total_pods as i64);
    }
}

#[async_trait]
impl UpdateSink for Reconciler {
    async fn apply_update(&self, update: CycleUpdate) -> Result<(), RelayError> {
        self.apply(update)
            .await
            .map(|_| ())
            .map_err(|e| RelayError::Rejected(e.to_string()))
    }

    async fn namespace_deleted(&self, namespace: &str) -> Result<(), RelayError> {
        self.remove_namespace(namespace).await;
        Ok(())
    }
}
