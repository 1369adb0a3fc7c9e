//! Kubernetes pod source
//!
//! Reads pod status and recent logs through the cluster API. Strictly
//! read-only: listing and log retrieval, no workload mutation.

use super::{async_trait, PodSource, SourceError};
use crate::models::{ContainerObservation, ContainerState, PodDescriptor};
use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};
use kube::api::{Api, ListParams, LogParams};

/// Bounds on the recent-log window requested per pod
#[derive(Debug, Clone, Copy)]
pub struct LogWindow {
    /// Last N lines
    pub tail_lines: i64,
    /// Only lines newer than this many seconds
    pub since_seconds: i64,
}

impl Default for LogWindow {
    fn default() -> Self {
        Self {
            tail_lines: 100,
            since_seconds: 60,
        }
    }
}

/// `PodSource` backed by the Kubernetes API
pub struct KubePodSource {
    pods: Api<Pod>,
    namespace: String,
    window: LogWindow,
}

impl KubePodSource {
    pub fn new(client: kube::Client, namespace: impl Into<String>, window: LogWindow) -> Self {
        let namespace = namespace.into();
        Self {
            pods: Api::namespaced(client, &namespace),
            namespace,
            window,
        }
    }

    /// Build a source from the ambient kubeconfig / in-cluster config.
    pub async fn from_default_config(
        namespace: impl Into<String>,
        window: LogWindow,
    ) -> Result<Self> {
        let client = kube::Client::try_default()
            .await
            .context("Failed to create Kubernetes client. Is kubectl configured?")?;
        Ok(Self::new(client, namespace, window))
    }
}

#[async_trait]
impl PodSource for KubePodSource {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list_pods(&self) -> Result<Vec<PodDescriptor>, SourceError> {
        match self.pods.list(&ListParams::default()).await {
            Ok(list) => Ok(list.items.into_iter().map(to_descriptor).collect()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                Err(SourceError::NamespaceNotFound)
            }
            Err(e) => Err(SourceError::Api(e.to_string())),
        }
    }

    async fn pod_logs(&self, pod_name: &str) -> Result<String, SourceError> {
        let params = LogParams {
            tail_lines: Some(self.window.tail_lines),
            since_seconds: Some(self.window.since_seconds),
            ..Default::default()
        };
        self.pods
            .logs(pod_name, &params)
            .await
            .map_err(|e| SourceError::Api(e.to_string()))
    }
}

/// Map an API pod object onto the descriptor the classifier consumes.
fn to_descriptor(pod: Pod) -> PodDescriptor {
    let name = pod.metadata.name.unwrap_or_default();
    let status = pod.status.unwrap_or_default();
    let phase = status.phase.unwrap_or_else(|| "Unknown".to_string());
    let containers = status
        .container_statuses
        .unwrap_or_default()
        .into_iter()
        .map(to_container_observation)
        .collect();

    PodDescriptor {
        name,
        phase,
        containers,
    }
}

fn to_container_observation(cs: ContainerStatus) -> ContainerObservation {
    let state = match cs.state {
        Some(state) => {
            if let Some(waiting) = state.waiting {
                ContainerState::Waiting {
                    reason: waiting.reason,
                }
            } else if let Some(terminated) = state.terminated {
                ContainerState::Terminated {
                    reason: terminated.reason,
                    exit_code: terminated.exit_code,
                }
            } else if state.running.is_some() {
                ContainerState::Running
            } else {
                ContainerState::Unknown
            }
        }
        None => ContainerState::Unknown,
    };

    ContainerObservation {
        ready: cs.ready,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        ContainerState as K8sContainerState, ContainerStateRunning, ContainerStateTerminated,
        ContainerStateWaiting, PodStatus as K8sPodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod_with_status(name: &str, status: K8sPodStatus) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: None,
            status: Some(status),
        }
    }

    #[test]
    fn maps_waiting_container() {
        let pod = pod_with_status(
            "dashboard",
            K8sPodStatus {
                phase: Some("Pending".to_string()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "dashboard".to_string(),
                    ready: false,
                    state: Some(K8sContainerState {
                        waiting: Some(ContainerStateWaiting {
                            reason: Some("ImagePullBackOff".to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        );

        let desc = to_descriptor(pod);
        assert_eq!(desc.name, "dashboard");
        assert_eq!(desc.phase, "Pending");
        assert_eq!(
            desc.containers[0].state,
            ContainerState::Waiting {
                reason: Some("ImagePullBackOff".to_string())
            }
        );
    }

    #[test]
    fn maps_terminated_container_with_exit_code() {
        let pod = pod_with_status(
            "postgres",
            K8sPodStatus {
                phase: Some("Failed".to_string()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "postgres".to_string(),
                    ready: false,
                    state: Some(K8sContainerState {
                        terminated: Some(ContainerStateTerminated {
                            reason: Some("Error".to_string()),
                            exit_code: 1,
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        );

        let desc = to_descriptor(pod);
        assert_eq!(
            desc.containers[0].state,
            ContainerState::Terminated {
                reason: Some("Error".to_string()),
                exit_code: 1
            }
        );
    }

    #[test]
    fn maps_running_container_and_readiness() {
        let pod = pod_with_status(
            "redis",
            K8sPodStatus {
                phase: Some("Running".to_string()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "redis".to_string(),
                    ready: true,
                    state: Some(K8sContainerState {
                        running: Some(ContainerStateRunning::default()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        );

        let desc = to_descriptor(pod);
        assert!(desc.containers[0].ready);
        assert_eq!(desc.containers[0].state, ContainerState::Running);
    }

    #[test]
    fn missing_status_defaults_to_unknown_phase() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("scheduling".to_string()),
                ..Default::default()
            },
            spec: None,
            status: None,
        };

        let desc = to_descriptor(pod);
        assert_eq!(desc.phase, "Unknown");
        assert!(desc.containers.is_empty());
    }

    #[test]
    fn default_log_window_is_bounded() {
        let window = LogWindow::default();
        assert_eq!(window.tail_lines, 100);
        assert_eq!(window.since_seconds, 60);
    }
}
