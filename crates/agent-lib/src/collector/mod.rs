//! Pod collection from the cluster
//!
//! This module provides the enumeration/log-retrieval boundary (`PodSource`),
//! the Kubernetes implementation of it, and the polling loop that drives one
//! collection cycle per tick.

mod cycle;
mod kube;

pub use cycle::{run_cycle, CycleError, CycleOutcome, PollConfig, PollLoop, PollLoopBuilder};
pub use kube::{KubePodSource, LogWindow};

use crate::models::PodDescriptor;
use thiserror::Error;

pub use async_trait::async_trait;

/// Read-only access to one namespace of the monitored cluster.
///
/// Implementations never mutate workloads. Log retrieval is best-effort
/// telemetry: callers degrade a per-pod failure to an empty result instead
/// of failing the cycle.
#[async_trait]
pub trait PodSource: Send + Sync {
    /// The namespace this source observes.
    fn namespace(&self) -> &str;

    /// Enumerate all pods in the namespace.
    ///
    /// `SourceError::NamespaceNotFound` is a state transition (the namespace
    /// was deleted), not a failure.
    async fn list_pods(&self) -> Result<Vec<PodDescriptor>, SourceError>;

    /// Fetch the recent log window for one pod.
    async fn pod_logs(&self, pod_name: &str) -> Result<String, SourceError>;
}

/// Failures surfaced by a `PodSource`
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("namespace not found")]
    NamespaceNotFound,
    #[error("cluster API request failed: {0}")]
    Api(String),
}
