//! Work-queue dispatch capability.
//!
//! The orchestrator enqueues a concrete task on `subtitle.download` or
//! `subtitle.translate` as a distinct step from publishing the
//! `*.requested` event (`spec.md` §4.1 step 4): the event notifies any
//! subscriber, the work-queue entry is what a worker actually consumes.
//! Abstracted behind a trait, mirroring [`subcast_store::JobStore`] and
//! [`subcast_events::EventBus`], so handlers are testable without a live
//! broker connection.

use async_trait::async_trait;
use subcast_domain::{DomainResult, DownloadTask, TranslationTask};

/// Capability implemented by the broker-backed work-queue dispatcher.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a download task on `subtitle.download`.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker is unreachable.
    async fn enqueue_download(&self, task: &DownloadTask) -> DomainResult<()>;

    /// Enqueue a translation task on `subtitle.translate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker is unreachable.
    async fn enqueue_translation(&self, task: &TranslationTask) -> DomainResult<()>;
}
