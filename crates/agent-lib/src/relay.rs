//! Persistence hand-off boundary
//!
//! `UpdateSink` is the consumer side of a collection cycle. The embedded
//! deployment wires it straight into the `Reconciler`; the remote
//! deployment relays cycles to the central backend over HTTP. Failed
//! deliveries are dropped, never queued: the next successful cycle's fresh
//! observation supersedes anything lost.

use crate::models::CycleUpdate;
use anyhow::{Context, Result};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use async_trait::async_trait;

/// Failures at the persistence boundary, distinguishable for logging and
/// health reporting
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("persistence endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("update rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Consumer boundary for per-cycle observations
#[async_trait]
pub trait UpdateSink: Send + Sync {
    /// Deliver one cycle's full pod set. An empty set is the
    /// namespace-deletion signal.
    async fn apply_update(&self, update: CycleUpdate) -> Result<(), RelayError>;

    /// Deliver the explicit namespace-deletion notification. Must be
    /// handled identically to an empty-set update.
    async fn namespace_deleted(&self, namespace: &str) -> Result<(), RelayError>;
}

/// Relays cycle updates to the central backend over HTTP
pub struct HttpRelay {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRelay {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        let base_url = Url::parse(base_url).context("Invalid backend URL")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, RelayError> {
        self.base_url
            .join(path)
            .map_err(|e| RelayError::Other(anyhow::anyhow!("invalid path {path}: {e}")))
    }

    fn classify_send_error(e: reqwest::Error) -> RelayError {
        if e.is_connect() || e.is_timeout() {
            RelayError::Unreachable(e.to_string())
        } else {
            RelayError::Other(anyhow::Error::new(e).context("request failed"))
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<(), RelayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(RelayError::Rejected(format!("{status}: {body}")))
    }
}

#[async_trait]
impl UpdateSink for HttpRelay {
    async fn apply_update(&self, update: CycleUpdate) -> Result<(), RelayError> {
        let url = self.endpoint("api/agent/update")?;
        let response = self
            .client
            .post(url)
            .json(&update)
            .send()
            .await
            .map_err(Self::classify_send_error)?;
        Self::check_status(response).await?;

        debug!(
            namespace = %update.namespace,
            pods = update.pods.len(),
            "Cycle update relayed to backend"
        );
        Ok(())
    }

    async fn namespace_deleted(&self, namespace: &str) -> Result<(), RelayError> {
        let url = self.endpoint(&format!("api/namespaces/{namespace}"))?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(Self::classify_send_error)?;
        Self::check_status(response).await?;

        debug!(namespace = %namespace, "Namespace deletion relayed to backend");
        Ok(())
    }
}
