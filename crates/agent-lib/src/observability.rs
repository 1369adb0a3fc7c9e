//! Observability infrastructure for the pod monitor
//!
//! Provides:
//! - Prometheus metrics (cycle latency, pod counts, error flow, relay health)
//! - Structured JSON logging for the significant domain events

use prometheus::{register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for cycle latency (seconds). Cycles do one blocking
/// log round trip per pod, so latencies span milliseconds to tens of
/// seconds.
const CYCLE_LATENCY_BUCKETS: &[f64] = &[
    0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AgentMetricsInner> = OnceLock::new();

struct AgentMetricsInner {
    cycle_latency_seconds: Histogram,
    cycles_total: IntCounter,
    cycle_failures_total: IntCounter,
    poll_overruns_total: IntCounter,
    relay_failures_total: IntCounter,
    pods_observed: IntGauge,
    error_pods: IntGauge,
    error_candidates_total: IntCounter,
    errors_recorded_total: IntCounter,
    errors_suppressed_total: IntCounter,
    namespaces_tracked: IntGauge,
    pods_tracked: IntGauge,
}

impl AgentMetricsInner {
    fn new() -> Self {
        Self {
            cycle_latency_seconds: register_histogram!(
                "podmon_cycle_latency_seconds",
                "Wall-clock duration of one collection cycle",
                CYCLE_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register cycle_latency_seconds"),

            cycles_total: register_int_counter!(
                "podmon_cycles_total",
                "Collection cycles started"
            )
            .expect("Failed to register cycles_total"),

            cycle_failures_total: register_int_counter!(
                "podmon_cycle_failures_total",
                "Collection cycles aborted by enumeration or relay failure"
            )
            .expect("Failed to register cycle_failures_total"),

            poll_overruns_total: register_int_counter!(
                "podmon_poll_overruns_total",
                "Cycles that ran longer than the poll interval"
            )
            .expect("Failed to register poll_overruns_total"),

            relay_failures_total: register_int_counter!(
                "podmon_relay_failures_total",
                "Failed hand-offs to the persistence boundary"
            )
            .expect("Failed to register relay_failures_total"),

            pods_observed: register_int_gauge!(
                "podmon_pods_observed",
                "Pods seen in the most recent cycle"
            )
            .expect("Failed to register pods_observed"),

            error_pods: register_int_gauge!(
                "podmon_error_pods",
                "Pods classified as erroring in the most recent cycle"
            )
            .expect("Failed to register error_pods"),

            error_candidates_total: register_int_counter!(
                "podmon_error_candidates_total",
                "Error candidates extracted from status and logs"
            )
            .expect("Failed to register error_candidates_total"),

            errors_recorded_total: register_int_counter!(
                "podmon_errors_recorded_total",
                "Errors persisted to the store"
            )
            .expect("Failed to register errors_recorded_total"),

            errors_suppressed_total: register_int_counter!(
                "podmon_errors_suppressed_total",
                "Errors suppressed by the dedup window"
            )
            .expect("Failed to register errors_suppressed_total"),

            namespaces_tracked: register_int_gauge!(
                "podmon_namespaces_tracked",
                "Namespaces currently present in the store"
            )
            .expect("Failed to register namespaces_tracked"),

            pods_tracked: register_int_gauge!(
                "podmon_pods_tracked",
                "Pods currently present in the store"
            )
            .expect("Failed to register pods_tracked"),
        }
    }
}

/// Agent metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone, Default)]
pub struct AgentMetrics {
    _private: (),
}

impl AgentMetrics {
    /// Create a metrics handle, initializing the global registry on first
    /// use.
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AgentMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AgentMetricsInner {
        GLOBAL_METRICS.get_or_init(AgentMetricsInner::new)
    }

    pub fn observe_cycle_latency(&self, duration_secs: f64) {
        self.inner().cycle_latency_seconds.observe(duration_secs);
    }

    pub fn inc_cycles(&self) {
        self.inner().cycles_total.inc();
    }

    pub fn inc_cycle_failures(&self) {
        self.inner().cycle_failures_total.inc();
    }

    pub fn inc_poll_overruns(&self) {
        self.inner().poll_overruns_total.inc();
    }

    pub fn inc_relay_failures(&self) {
        self.inner().relay_failures_total.inc();
    }

    pub fn set_pods_observed(&self, count: i64) {
        self.inner().pods_observed.set(count);
    }

    pub fn set_error_pods(&self, count: i64) {
        self.inner().error_pods.set(count);
    }

    pub fn inc_candidates(&self, count: u64) {
        self.inner().error_candidates_total.inc_by(count);
    }

    pub fn inc_errors_recorded(&self) {
        self.inner().errors_recorded_total.inc();
    }

    pub fn inc_errors_suppressed(&self) {
        self.inner().errors_suppressed_total.inc();
    }

    pub fn set_tracked(&self, namespaces: i64, pods: i64) {
        self.inner().namespaces_tracked.set(namespaces);
        self.inner().pods_tracked.set(pods);
    }
}

/// Structured logger for the agent's domain events
///
/// Emits consistent JSON-formatted events for cycles, namespace lifecycle,
/// and relay status.
#[derive(Clone)]
pub struct StructuredLogger {
    namespace: String,
}

impl StructuredLogger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn log_startup(&self, version: &str, sink_mode: &str) {
        info!(
            event = "agent_started",
            namespace = %self.namespace,
            agent_version = %version,
            sink_mode = %sink_mode,
            "Pod monitor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "agent_shutdown",
            namespace = %self.namespace,
            reason = %reason,
            "Pod monitor shutting down"
        );
    }

    pub fn log_cycle_complete(&self, pods: usize, erroring: usize, candidates: usize) {
        info!(
            event = "cycle_complete",
            namespace = %self.namespace,
            pods = pods,
            erroring_pods = erroring,
            error_candidates = candidates,
            "Collection cycle complete"
        );
    }

    pub fn log_namespace_deleted(&self) {
        info!(
            event = "namespace_deleted",
            namespace = %self.namespace,
            "Namespace no longer exists, deletion signal delivered"
        );
    }

    pub fn log_relay_failure(&self, error: &dyn fmt::Display) {
        warn!(
            event = "relay_failure",
            namespace = %self.namespace,
            error = %error,
            "Observations dropped, next cycle supersedes them"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_handle_is_usable() {
        let metrics = AgentMetrics::new();

        metrics.observe_cycle_latency(0.2);
        metrics.inc_cycles();
        metrics.inc_cycle_failures();
        metrics.inc_poll_overruns();
        metrics.inc_relay_failures();
        metrics.set_pods_observed(5);
        metrics.set_error_pods(2);
        metrics.inc_candidates(3);
        metrics.inc_errors_recorded();
        metrics.inc_errors_suppressed();
        metrics.set_tracked(1, 5);
    }

    #[test]
    fn logger_holds_namespace_scope() {
        let logger = StructuredLogger::new("demo");
        assert_eq!(logger.namespace, "demo");
        // Event emission must not panic without a subscriber installed
        logger.log_cycle_complete(3, 1, 1);
        logger.log_namespace_deleted();
    }
}
