//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters/gauges the orchestrator, workers, and scanner need
//!   to report job throughput and broker/store health.

use std::convert::TryFrom;
use std::time::Duration;

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: std::sync::Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    events_emitted_total: IntCounterVec,
    jobs_submitted_total: IntCounterVec,
    jobs_completed_total: IntCounterVec,
    translation_chunks_total: IntCounterVec,
    chunk_retries_total: IntCounter,
    dedup_hits_total: IntCounter,
    checkpoint_resumes_total: IntCounter,
    queue_depth: IntGauge,
    active_jobs: IntGauge,
    broker_connected: IntGauge,
    store_connected: IntGauge,
}

/// Snapshot of selected gauges and counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Current depth of the worker's primary consume queue.
    pub queue_depth: i64,
    /// Jobs currently in flight for this service.
    pub active_jobs: i64,
    /// Whether the broker connection is currently healthy (1) or not (0).
    pub broker_connected: i64,
    /// Whether the store connection is currently healthy (1) or not (0).
    pub store_connected: i64,
    /// Total chunk-level retries observed by the translator.
    pub chunk_retries_total: u64,
    /// Total deduplication hits (reused in-flight jobs) observed.
    pub dedup_hits_total: u64,
    /// Total checkpoint resumes observed by the translator.
    pub checkpoint_resumes_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let events_emitted_total = IntCounterVec::new(
            Opts::new("events_emitted_total", "Domain events emitted by kind"),
            &["kind"],
        )?;
        let jobs_submitted_total = IntCounterVec::new(
            Opts::new("jobs_submitted_total", "Jobs submitted by kind"),
            &["kind"],
        )?;
        let jobs_completed_total = IntCounterVec::new(
            Opts::new(
                "jobs_completed_total",
                "Jobs completed by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;
        let translation_chunks_total = IntCounterVec::new(
            Opts::new(
                "translation_chunks_total",
                "Translation chunks processed by outcome",
            ),
            &["outcome"],
        )?;
        let chunk_retries_total = IntCounter::with_opts(Opts::new(
            "translation_chunk_retries_total",
            "Translation chunk retries due to transient failures",
        ))?;
        let dedup_hits_total = IntCounter::with_opts(Opts::new(
            "dedup_hits_total",
            "Deduplicated job submissions that reused an in-flight job",
        ))?;
        let checkpoint_resumes_total = IntCounter::with_opts(Opts::new(
            "checkpoint_resumes_total",
            "Translation jobs resumed from a saved checkpoint",
        ))?;
        let queue_depth =
            IntGauge::with_opts(Opts::new("queue_depth", "Depth of the primary work queue"))?;
        let active_jobs =
            IntGauge::with_opts(Opts::new("active_jobs", "Jobs currently in flight"))?;
        let broker_connected = IntGauge::with_opts(Opts::new(
            "broker_connected",
            "Whether the broker connection is healthy (1) or not (0)",
        ))?;
        let store_connected = IntGauge::with_opts(Opts::new(
            "store_connected",
            "Whether the store connection is healthy (1) or not (0)",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(events_emitted_total.clone()))?;
        registry.register(Box::new(jobs_submitted_total.clone()))?;
        registry.register(Box::new(jobs_completed_total.clone()))?;
        registry.register(Box::new(translation_chunks_total.clone()))?;
        registry.register(Box::new(chunk_retries_total.clone()))?;
        registry.register(Box::new(dedup_hits_total.clone()))?;
        registry.register(Box::new(checkpoint_resumes_total.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;
        registry.register(Box::new(active_jobs.clone()))?;
        registry.register(Box::new(broker_connected.clone()))?;
        registry.register(Box::new(store_connected.clone()))?;

        Ok(Self {
            inner: std::sync::Arc::new(MetricsInner {
                registry,
                http_requests_total,
                events_emitted_total,
                jobs_submitted_total,
                jobs_completed_total,
                translation_chunks_total,
                chunk_retries_total,
                dedup_hits_total,
                checkpoint_resumes_total,
                queue_depth,
                active_jobs,
                broker_connected,
                store_connected,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the emitted event counter for the specific event kind.
    pub fn inc_event(&self, event_kind: &str) {
        self.inner
            .events_emitted_total
            .with_label_values(&[event_kind])
            .inc();
    }

    /// Increment the job-submitted counter for the given job kind.
    pub fn inc_job_submitted(&self, kind: &str) {
        self.inner
            .jobs_submitted_total
            .with_label_values(&[kind])
            .inc();
    }

    /// Increment the job-completed counter for the given kind and outcome.
    pub fn inc_job_completed(&self, kind: &str, outcome: &str) {
        self.inner
            .jobs_completed_total
            .with_label_values(&[kind, outcome])
            .inc();
    }

    /// Increment the translation chunk counter for the given outcome.
    pub fn inc_translation_chunk(&self, outcome: &str) {
        self.inner
            .translation_chunks_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Increment the chunk retry counter.
    pub fn inc_chunk_retry(&self) {
        self.inner.chunk_retries_total.inc();
    }

    /// Increment the deduplication hit counter.
    pub fn inc_dedup_hit(&self) {
        self.inner.dedup_hits_total.inc();
    }

    /// Increment the checkpoint resume counter.
    pub fn inc_checkpoint_resume(&self) {
        self.inner.checkpoint_resumes_total.inc();
    }

    /// Set the queue depth gauge.
    pub fn set_queue_depth(&self, depth: i64) {
        self.inner.queue_depth.set(depth);
    }

    /// Set the active jobs gauge.
    pub fn set_active_jobs(&self, count: i64) {
        self.inner.active_jobs.set(count);
    }

    /// Record whether the broker connection is currently healthy.
    pub fn set_broker_connected(&self, connected: bool) {
        self.inner.broker_connected.set(i64::from(connected));
    }

    /// Record whether the store connection is currently healthy.
    pub fn set_store_connected(&self, connected: bool) {
        self.inner.store_connected.set(i64::from(connected));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("failed to encode Prometheus metrics")?;
        String::from_utf8(buffer).context("metrics output was not valid UTF-8")
    }

    /// Take a point-in-time snapshot of the most relevant gauges and counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_depth: self.inner.queue_depth.get(),
            active_jobs: self.inner.active_jobs.get(),
            broker_connected: self.inner.broker_connected.get(),
            store_connected: self.inner.store_connected.get(),
            chunk_retries_total: self.inner.chunk_retries_total.get(),
            dedup_hits_total: self.inner.dedup_hits_total.get(),
            checkpoint_resumes_total: self.inner.checkpoint_resumes_total.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn duration_to_ms_saturates_on_large_values() {
        let duration = Duration::from_secs(u64::MAX / 2);
        assert_eq!(Metrics::duration_to_ms(duration), i64::MAX);
    }

    #[test]
    fn metrics_snapshot_reflects_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/v1/jobs", 202);
        metrics.inc_event("download.completed");
        metrics.inc_job_submitted("download");
        metrics.inc_job_completed("download", "success");
        metrics.inc_translation_chunk("success");
        metrics.inc_chunk_retry();
        metrics.inc_dedup_hit();
        metrics.inc_checkpoint_resume();
        metrics.set_queue_depth(7);
        metrics.set_active_jobs(3);
        metrics.set_broker_connected(true);
        metrics.set_store_connected(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queue_depth, 7);
        assert_eq!(snapshot.active_jobs, 3);
        assert_eq!(snapshot.broker_connected, 1);
        assert_eq!(snapshot.store_connected, 0);
        assert_eq!(snapshot.chunk_retries_total, 1);
        assert_eq!(snapshot.dedup_hits_total, 1);
        assert_eq!(snapshot.checkpoint_resumes_total, 1);

        let rendered = metrics.render()?;
        assert!(rendered.contains("jobs_submitted_total"));
        assert!(rendered.contains("translation_chunks_total"));
        assert!(rendered.contains("store_connected"));
        Ok(())
    }
}
