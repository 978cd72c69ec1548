//! Shared application state injected into every handler via axum's
//! [`axum::extract::State`].

use std::sync::Arc;

use subcast_events::EventBus;
use subcast_store::{DedupStore, JobStore};
use subcast_telemetry::Metrics;

use crate::queue::TaskQueue;

/// Name this service stamps on every envelope it publishes.
pub const EVENT_SOURCE: &str = "orchestrator";

/// Everything a handler needs to serve a request, held behind trait objects
/// so the router can be exercised against fakes in tests without a live
/// broker or store connection.
pub struct ApiState {
    /// Authoritative job record and audit-list store.
    pub job_store: Arc<dyn JobStore>,
    /// Deduplication reservation store.
    pub dedup_store: Arc<dyn DedupStore>,
    /// Topic exchange publisher.
    pub event_bus: Arc<dyn EventBus>,
    /// Work-queue dispatcher.
    pub task_queue: Arc<dyn TaskQueue>,
    /// Prometheus metrics registry.
    pub metrics: Metrics,
}

impl ApiState {
    /// Build a new state from its constituent dependencies.
    #[must_use]
    pub fn new(
        job_store: Arc<dyn JobStore>,
        dedup_store: Arc<dyn DedupStore>,
        event_bus: Arc<dyn EventBus>,
        task_queue: Arc<dyn TaskQueue>,
        metrics: Metrics,
    ) -> Self {
        Self {
            job_store,
            dedup_store,
            event_bus,
            task_queue,
            metrics,
        }
    }
}
