//! Durable state for observed namespaces, pods, and errors
//!
//! The relational schema lives with the external persistence service; this
//! in-process store keeps the same three entities and the same lifecycle
//! rules behind one `RwLock`. A single lock covers all three tables because
//! the dedup check-then-insert and the cascade deletes need cross-table
//! atomicity (the narrow transaction the dedup contract requires).
//!
//! Ownership: a namespace owns its pods, a pod owns its errors. Deletion
//! always cascades downward.

use crate::classify::is_error_label;
use crate::models::{AiResolutionStatus, ErrorCandidate, Priority};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// A monitored namespace
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceRecord {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pod row, unique per `(name, namespace_id)`
#[derive(Debug, Clone, Serialize)]
pub struct PodRecord {
    pub id: u64,
    pub namespace_id: u64,
    pub name: String,
    pub status: String,
    pub last_check: DateTime<Utc>,
}

/// A persisted error. Never updated after insertion except through the
/// AI-resolution status patch; never deleted except by cascade.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub id: u64,
    pub pod_id: u64,
    pub message: String,
    pub error_type: String,
    pub priority: Priority,
    pub ai_resolution_status: AiResolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_resolution_steps: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

/// Dashboard headline counts
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_namespaces: usize,
    pub total_pods: usize,
    pub running_pods: usize,
    pub error_pods: usize,
    pub errors_today: usize,
}

/// A pod with its rolling error count, for the namespace listing
#[derive(Debug, Clone, Serialize)]
pub struct PodSummary {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub last_check: DateTime<Utc>,
    pub error_count: usize,
}

/// A recent error joined with its pod and namespace names
#[derive(Debug, Clone, Serialize)]
pub struct RecentError {
    pub id: u64,
    pub message: String,
    pub error_type: String,
    pub priority: Priority,
    pub ai_resolution_status: AiResolutionStatus,
    pub timestamp: DateTime<Utc>,
    pub pod_name: String,
    pub namespace_name: String,
}

/// Store-level failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("error {0} not found")]
    ErrorNotFound(u64),
}

#[derive(Default)]
struct Tables {
    namespaces: HashMap<u64, NamespaceRecord>,
    pods: HashMap<u64, PodRecord>,
    errors: HashMap<u64, ErrorRecord>,
    next_id: u64,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn remove_pod_cascade(&mut self, pod_id: u64) {
        self.errors.retain(|_, e| e.pod_id != pod_id);
        self.pods.remove(&pod_id);
    }
}

/// In-process store for namespaces, pods, and errors
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a namespace id by name.
    pub async fn namespace_id(&self, name: &str) -> Option<u64> {
        let tables = self.tables.read().await;
        tables
            .namespaces
            .values()
            .find(|ns| ns.name == name)
            .map(|ns| ns.id)
    }

    /// Create the namespace if absent, else touch `updated_at`.
    pub async fn upsert_namespace(&self, name: &str) -> u64 {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(ns) = tables.namespaces.values_mut().find(|ns| ns.name == name) {
            ns.updated_at = now;
            return ns.id;
        }

        let id = tables.allocate_id();
        tables.namespaces.insert(
            id,
            NamespaceRecord {
                id,
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Delete a namespace and everything it owns. Returns false when the
    /// namespace was already absent (the no-op path).
    pub async fn delete_namespace(&self, name: &str) -> bool {
        let mut tables = self.tables.write().await;
        let Some(ns_id) = tables
            .namespaces
            .values()
            .find(|ns| ns.name == name)
            .map(|ns| ns.id)
        else {
            return false;
        };

        let pod_ids: Vec<u64> = tables
            .pods
            .values()
            .filter(|p| p.namespace_id == ns_id)
            .map(|p| p.id)
            .collect();
        for pod_id in pod_ids {
            tables.remove_pod_cascade(pod_id);
        }
        tables.namespaces.remove(&ns_id);
        true
    }

    /// Names of all pods currently stored for a namespace.
    pub async fn pod_names(&self, namespace_id: u64) -> Vec<String> {
        let tables = self.tables.read().await;
        tables
            .pods
            .values()
            .filter(|p| p.namespace_id == namespace_id)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Delete one pod (and its errors) by name.
    pub async fn delete_pod(&self, namespace_id: u64, name: &str) -> bool {
        let mut tables = self.tables.write().await;
        let Some(pod_id) = tables
            .pods
            .values()
            .find(|p| p.namespace_id == namespace_id && p.name == name)
            .map(|p| p.id)
        else {
            return false;
        };
        tables.remove_pod_cascade(pod_id);
        true
    }

    /// Insert the pod or update its status and `last_check`, preserving row
    /// identity on update.
    pub async fn upsert_pod(&self, namespace_id: u64, name: &str, status: &str) -> u64 {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(pod) = tables
            .pods
            .values_mut()
            .find(|p| p.namespace_id == namespace_id && p.name == name)
        {
            pod.status = status.to_string();
            pod.last_check = now;
            return pod.id;
        }

        let id = tables.allocate_id();
        tables.pods.insert(
            id,
            PodRecord {
                id,
                namespace_id,
                name: name.to_string(),
                status: status.to_string(),
                last_check: now,
            },
        );
        id
    }

    /// Insert an error unless an identical `(pod_id, type, message)` tuple
    /// was recorded within the dedup window. Check and insert happen under
    /// one write-lock acquisition.
    pub async fn record_error_if_new(
        &self,
        pod_id: u64,
        candidate: &ErrorCandidate,
        priority: Priority,
        ai_status: AiResolutionStatus,
        window: Duration,
    ) -> Option<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let cutoff = now - chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::zero());

        let duplicate = tables.errors.values().any(|e| {
            e.pod_id == pod_id
                && e.error_type == candidate.error_type
                && e.message == candidate.message
                && e.timestamp > cutoff
        });
        if duplicate {
            return None;
        }

        let id = tables.allocate_id();
        tables.errors.insert(
            id,
            ErrorRecord {
                id,
                pod_id,
                message: candidate.message.clone(),
                error_type: candidate.error_type.clone(),
                priority,
                ai_resolution_status: ai_status,
                ai_resolution_steps: None,
                resolved_at: None,
                timestamp: now,
            },
        );
        Some(id)
    }

    /// The only permitted mutation of a persisted error: patch the advisory
    /// AI-resolution status, optionally recording resolution steps.
    pub async fn set_ai_status(
        &self,
        error_id: u64,
        status: AiResolutionStatus,
        steps: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let error = tables
            .errors
            .get_mut(&error_id)
            .ok_or(StoreError::ErrorNotFound(error_id))?;

        error.ai_resolution_status = status;
        if steps.is_some() {
            error.ai_resolution_steps = steps;
        }
        if status == AiResolutionStatus::Resolved {
            error.resolved_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Fetch one error row.
    pub async fn error(&self, error_id: u64) -> Option<ErrorRecord> {
        let tables = self.tables.read().await;
        tables.errors.get(&error_id).cloned()
    }

    /// Headline counts for the dashboard.
    pub async fn stats(&self) -> DashboardStats {
        let tables = self.tables.read().await;
        let today = Utc::now().date_naive();

        let error_pods = tables
            .pods
            .values()
            .filter(|p| is_error_label(&p.status))
            .count();

        DashboardStats {
            total_namespaces: tables.namespaces.len(),
            total_pods: tables.pods.len(),
            running_pods: tables.pods.len() - error_pods,
            error_pods,
            errors_today: tables
                .errors
                .values()
                .filter(|e| e.timestamp.date_naive() == today)
                .count(),
        }
    }

    /// All monitored namespaces, ordered by name.
    pub async fn namespaces(&self) -> Vec<NamespaceRecord> {
        let tables = self.tables.read().await;
        let mut namespaces: Vec<_> = tables.namespaces.values().cloned().collect();
        namespaces.sort_by(|a, b| a.name.cmp(&b.name));
        namespaces
    }

    /// Pods of one namespace with error counts over the rolling window,
    /// ordered by name. `None` when the namespace is unknown.
    pub async fn pods_in_namespace(
        &self,
        namespace_id: u64,
        error_window: Duration,
    ) -> Option<Vec<PodSummary>> {
        let tables = self.tables.read().await;
        tables.namespaces.get(&namespace_id)?;

        let cutoff =
            Utc::now() - chrono::Duration::from_std(error_window).unwrap_or_else(|_| chrono::Duration::zero());
        let mut pods: Vec<PodSummary> = tables
            .pods
            .values()
            .filter(|p| p.namespace_id == namespace_id)
            .map(|p| PodSummary {
                id: p.id,
                name: p.name.clone(),
                status: p.status.clone(),
                last_check: p.last_check,
                error_count: tables
                    .errors
                    .values()
                    .filter(|e| e.pod_id == p.id && e.timestamp > cutoff)
                    .count(),
            })
            .collect();
        pods.sort_by(|a, b| a.name.cmp(&b.name));
        Some(pods)
    }

    /// Errors of one pod, newest first, bounded. `None` when the pod is
    /// unknown.
    pub async fn pod_errors(&self, pod_id: u64, limit: usize) -> Option<Vec<ErrorRecord>> {
        let tables = self.tables.read().await;
        tables.pods.get(&pod_id)?;

        let mut errors: Vec<_> = tables
            .errors
            .values()
            .filter(|e| e.pod_id == pod_id)
            .cloned()
            .collect();
        errors.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        errors.truncate(limit);
        Some(errors)
    }

    /// Most recent errors across all namespaces, ordered by priority
    /// (P0 first) then recency.
    pub async fn recent_errors(&self, limit: usize) -> Vec<RecentError> {
        let tables = self.tables.read().await;

        let mut errors: Vec<RecentError> = tables
            .errors
            .values()
            .filter_map(|e| {
                let pod = tables.pods.get(&e.pod_id)?;
                let namespace = tables.namespaces.get(&pod.namespace_id)?;
                Some(RecentError {
                    id: e.id,
                    message: e.message.clone(),
                    error_type: e.error_type.clone(),
                    priority: e.priority,
                    ai_resolution_status: e.ai_resolution_status,
                    timestamp: e.timestamp,
                    pod_name: pod.name.clone(),
                    namespace_name: namespace.name.clone(),
                })
            })
            .collect();
        errors.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        errors.truncate(limit);
        errors
    }
}
