//! Pod snapshot building
//!
//! Combines the status classifier, log extractor, and log-fetch policy into
//! one `PodObservation` per pod per cycle. Every pod whose status indicates
//! an error yields at least one error candidate, even when its failure
//! never reached stdout/stderr (image pull failures before the container
//! ever starts, for example).

use crate::classify::{ClassifierMode, LogErrorExtractor, PodStatus, StatusClassifier};
use crate::models::{ErrorCandidate, PodDescriptor, PodObservation};
use serde::{Deserialize, Serialize};

/// When to retrieve logs for a pod.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFetchPolicy {
    /// Fetch logs for every pod, every cycle
    #[default]
    Always,
    /// Fetch logs only when the classified status looks wrong
    OnError,
}

/// Builds one `PodObservation` per pod from classifier + extractor output
#[derive(Debug)]
pub struct SnapshotBuilder {
    classifier: StatusClassifier,
    extractor: LogErrorExtractor,
    policy: LogFetchPolicy,
}

impl SnapshotBuilder {
    pub fn new(mode: ClassifierMode, policy: LogFetchPolicy) -> Self {
        Self {
            classifier: StatusClassifier::new(mode),
            extractor: LogErrorExtractor::new(),
            policy,
        }
    }

    /// Classify a pod's status ahead of the log-fetch decision.
    pub fn classify(&self, pod: &PodDescriptor) -> PodStatus {
        self.classifier.classify(pod)
    }

    /// Whether logs should be retrieved for a pod with this status.
    pub fn wants_logs(&self, status: &PodStatus) -> bool {
        match self.policy {
            LogFetchPolicy::Always => true,
            LogFetchPolicy::OnError => status.is_error,
        }
    }

    /// Produce the observation for one pod. `logs` is `None` when retrieval
    /// was skipped by policy or failed; log failures degrade to an empty
    /// candidate list, never to a cycle failure.
    pub fn observe(
        &self,
        pod: &PodDescriptor,
        status: PodStatus,
        logs: Option<&str>,
    ) -> PodObservation {
        let mut errors = logs
            .map(|text| self.extractor.extract(text))
            .unwrap_or_default();

        if status.is_error && errors.is_empty() {
            errors.push(ErrorCandidate {
                message: format!("Pod status: {}", status.label),
                error_type: status.label.clone(),
            });
        }

        PodObservation {
            name: pod.name.clone(),
            status: status.label,
            errors,
        }
    }

    /// Classify and observe in one step.
    pub fn build(&self, pod: &PodDescriptor, logs: Option<&str>) -> PodObservation {
        let status = self.classify(pod);
        self.observe(pod, status, logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContainerObservation, ContainerState};

    fn erroring_pod(reason: &str) -> PodDescriptor {
        PodDescriptor {
            name: "dashboard".to_string(),
            phase: "Pending".to_string(),
            containers: vec![ContainerObservation {
                ready: false,
                state: ContainerState::Waiting {
                    reason: Some(reason.to_string()),
                },
            }],
        }
    }

    fn healthy_pod(name: &str) -> PodDescriptor {
        PodDescriptor {
            name: name.to_string(),
            phase: "Running".to_string(),
            containers: vec![ContainerObservation {
                ready: true,
                state: ContainerState::Running,
            }],
        }
    }

    #[test]
    fn erroring_pod_without_log_match_gets_fallback_candidate() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let pod = erroring_pod("ImagePullBackOff");

        let obs = builder.build(&pod, Some("[INFO] nothing interesting\n"));

        assert_eq!(obs.status, "ImagePullBackOff");
        assert_eq!(obs.errors.len(), 1);
        assert_eq!(obs.errors[0].message, "Pod status: ImagePullBackOff");
        assert_eq!(obs.errors[0].error_type, "ImagePullBackOff");
    }

    #[test]
    fn fallback_also_applies_when_logs_unavailable() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let pod = erroring_pod("CrashLoopBackOff");

        let obs = builder.build(&pod, None);

        assert_eq!(obs.errors.len(), 1);
        assert_eq!(obs.errors[0].error_type, "CrashLoopBackOff");
    }

    #[test]
    fn log_candidates_suppress_the_fallback() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let pod = erroring_pod("CrashLoopBackOff");

        let obs = builder.build(&pod, Some("Error: segfault in worker\n"));

        assert_eq!(obs.errors.len(), 1);
        assert_eq!(obs.errors[0].error_type, "Error");
        assert!(obs.errors[0].message.contains("segfault"));
    }

    #[test]
    fn healthy_pod_with_clean_logs_has_no_candidates() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let pod = healthy_pod("redis");

        let obs = builder.build(&pod, Some("[INFO] Redis cache operational\n"));

        assert_eq!(obs.status, "Running");
        assert!(obs.errors.is_empty());
    }

    #[test]
    fn healthy_pod_can_still_surface_log_errors() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let pod = healthy_pod("postgres");

        let obs = builder.build(&pod, Some("request failed with status 500\n"));

        assert_eq!(obs.status, "Running");
        assert_eq!(obs.errors.len(), 1);
        assert_eq!(obs.errors[0].error_type, "Failed");
    }

    #[test]
    fn on_error_policy_skips_logs_for_healthy_pods() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::OnError);
        let healthy = builder.classify(&healthy_pod("redis"));
        let broken = builder.classify(&erroring_pod("ErrImagePull"));

        assert!(!builder.wants_logs(&healthy));
        assert!(builder.wants_logs(&broken));
    }

    #[test]
    fn always_policy_fetches_logs_for_everything() {
        let builder = SnapshotBuilder::new(ClassifierMode::Reason, LogFetchPolicy::Always);
        let healthy = builder.classify(&healthy_pod("redis"));
        assert!(builder.wants_logs(&healthy));
    }

    #[test]
    fn coarse_mode_fallback_uses_coarse_label() {
        let builder = SnapshotBuilder::new(ClassifierMode::Coarse, LogFetchPolicy::Always);
        let pod = erroring_pod("ImagePullBackOff");

        let obs = builder.build(&pod, None);

        assert_eq!(obs.status, "error");
        assert_eq!(obs.errors[0].error_type, "error");
        assert_eq!(obs.errors[0].message, "Pod status: error");
    }
}
