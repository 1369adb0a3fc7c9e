//! Core data models for the pod monitor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Runtime state of a single container, as reported by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    /// Container is waiting to start (image pull, crash backoff, ...)
    Waiting { reason: Option<String> },
    /// Container exited
    Terminated {
        reason: Option<String>,
        exit_code: i32,
    },
    /// Container is running
    Running,
    /// No state reported yet
    Unknown,
}

/// Status of one container inside a pod
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerObservation {
    pub ready: bool,
    pub state: ContainerState,
}

/// Raw pod descriptor as returned by pod enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodDescriptor {
    pub name: String,
    /// Kubernetes phase: Running, Pending, Failed, Succeeded, Unknown
    pub phase: String,
    pub containers: Vec<ContainerObservation>,
}

impl PodDescriptor {
    /// Descriptor for a pod with no container statuses yet (still scheduling)
    pub fn phase_only(name: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: phase.into(),
            containers: Vec::new(),
        }
    }
}

/// A line-derived, not-yet-persisted failure signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCandidate {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

/// One observation of one pod, produced fresh each polling cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodObservation {
    pub name: String,
    /// Normalized status label (Kubernetes reason, or `running`/`error` in coarse mode)
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorCandidate>,
}

/// Per-cycle payload handed to the persistence boundary.
///
/// An empty `pods` list is a meaningful signal: the namespace no longer has
/// any pods and should be removed from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleUpdate {
    pub namespace: String,
    pub pods: Vec<PodObservation>,
}

impl CycleUpdate {
    /// Reject malformed payloads before any state is touched.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.namespace.trim().is_empty() {
            return Err(IngestError::MissingNamespace);
        }
        if let Some(pod) = self.pods.iter().find(|p| p.name.trim().is_empty()) {
            return Err(IngestError::UnnamedPod {
                status: pod.status.clone(),
            });
        }
        Ok(())
    }
}

/// Rejection reasons for inbound cycle payloads
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("payload has no namespace")]
    MissingNamespace,
    #[error("payload contains a pod with an empty name (status {status})")]
    UnnamedPod { status: String },
}

/// Severity tier assigned to a persisted error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    /// Not reachable by the keyword scan; reserved for manual assignment
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory lifecycle tag describing whether an external remediation
/// process is engaged for a persisted error
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiResolutionStatus {
    #[default]
    NotStarted,
    Analyzing,
    Resolving,
    Resolved,
    ManualRequired,
}

impl AiResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiResolutionStatus::NotStarted => "not_started",
            AiResolutionStatus::Analyzing => "analyzing",
            AiResolutionStatus::Resolving => "resolving",
            AiResolutionStatus::Resolved => "resolved",
            AiResolutionStatus::ManualRequired => "manual_required",
        }
    }
}

impl fmt::Display for AiResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiResolutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(AiResolutionStatus::NotStarted),
            "analyzing" => Ok(AiResolutionStatus::Analyzing),
            "resolving" => Ok(AiResolutionStatus::Resolving),
            "resolved" => Ok(AiResolutionStatus::Resolved),
            "manual_required" => Ok(AiResolutionStatus::ManualRequired),
            other => Err(format!("unknown AI resolution status: {other}")),
        }
    }
}
