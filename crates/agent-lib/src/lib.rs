//! Core library for the pod monitor agent
//!
//! This crate provides:
//! - Pod status classification and log-based error extraction
//! - Per-cycle snapshot building
//! - The polling collection loop over a namespace
//! - Reconciliation of observed state into the durable store
//! - The relay boundary towards the central backend
//! - Health checks and observability

pub mod classify;
pub mod collector;
pub mod health;
pub mod models;
pub mod observability;
pub mod reconcile;
pub mod relay;
pub mod snapshot;

pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AgentMetrics, StructuredLogger};
