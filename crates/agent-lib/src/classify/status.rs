//! Pod status classification
//!
//! Maps a structural pod status (phase plus per-container states) to one
//! normalized label. The first container's state is examined in priority
//! order: a waiting reason wins over a terminated reason, which wins over
//! "running but not ready", which wins over the bare phase. A waiting
//! reason like `CrashLoopBackOff` is more actionable than the generic
//! phase `Pending`.

use crate::models::{ContainerState, PodDescriptor};
use serde::{Deserialize, Serialize};

/// Statuses treated as erroring in fine-grained (reason) mode
const ERROR_STATUSES: &[&str] = &[
    "Failed",
    "Unknown",
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
    "Error",
    "OOMKilled",
    "Terminated",
];

/// Phases and reasons that map to `error` in coarse mode
const COARSE_ERROR_REASONS: &[&str] = &[
    "Failed",
    "Unknown",
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
];

/// Classification granularity.
///
/// Both granularities are observed in the wild and downstream consumers
/// depend on which one is in effect, so the choice is configuration, not
/// code. `Reason` is canonical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Fine-grained Kubernetes reason (`CrashLoopBackOff`, `Pending`, ...)
    #[default]
    Reason,
    /// Coarse `running`/`error` flag
    Coarse,
}

/// Classifier verdict for one pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodStatus {
    pub label: String,
    pub is_error: bool,
}

/// Classifies pod status structures into normalized labels
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier {
    mode: ClassifierMode,
}

impl StatusClassifier {
    pub fn new(mode: ClassifierMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Classify one pod descriptor.
    pub fn classify(&self, pod: &PodDescriptor) -> PodStatus {
        match self.mode {
            ClassifierMode::Reason => {
                let label = reason_label(pod);
                let is_error = is_error_label(&label);
                PodStatus { label, is_error }
            }
            ClassifierMode::Coarse => {
                let is_error = coarse_is_error(pod);
                PodStatus {
                    label: if is_error { "error" } else { "running" }.to_string(),
                    is_error,
                }
            }
        }
    }
}

/// Fine-grained label: first container's waiting reason, then terminated
/// reason, then running-not-ready, then the bare phase.
fn reason_label(pod: &PodDescriptor) -> String {
    if let Some(container) = pod.containers.first() {
        match &container.state {
            ContainerState::Waiting { reason } => {
                return reason.clone().unwrap_or_else(|| pod.phase.clone());
            }
            ContainerState::Terminated { reason, .. } => {
                return reason.clone().unwrap_or_else(|| "Terminated".to_string());
            }
            ContainerState::Running if !container.ready => {
                return "NotReady".to_string();
            }
            _ => {}
        }
    }
    pod.phase.clone()
}

/// Coarse verdict: allow-listed phase/reason, non-zero exit code, or a
/// running-but-not-ready container.
fn coarse_is_error(pod: &PodDescriptor) -> bool {
    if COARSE_ERROR_REASONS.contains(&pod.phase.as_str()) {
        return true;
    }
    pod.containers.iter().any(|c| match &c.state {
        ContainerState::Waiting { reason } => reason
            .as_deref()
            .map(|r| COARSE_ERROR_REASONS.contains(&r))
            .unwrap_or(false),
        ContainerState::Terminated { exit_code, .. } => *exit_code != 0,
        ContainerState::Running => !c.ready,
        ContainerState::Unknown => false,
    })
}

/// Whether a fine-grained label counts as erroring.
///
/// Also recognizes the coarse `error` label so store-side projections can
/// bucket pods regardless of the mode the agent ran in.
pub fn is_error_label(label: &str) -> bool {
    label == "error" || ERROR_STATUSES.contains(&label)
}
