//! Broker-backed [`TaskQueue`] implementation.
//!
//! Wraps a dedicated [`Channel`] and publishes onto the two work queues via
//! [`publish_task`]. Kept distinct from the channel [`subcast_broker::AmqpEventBus`]
//! consumes on, since a publish-confirm channel and a consume channel serve
//! different lifecycles.

use async_trait::async_trait;
use lapin::Channel;
use subcast_api::queue::TaskQueue;
use subcast_broker::{DOWNLOAD_QUEUE, TRANSLATE_QUEUE, publish_task};
use subcast_domain::{DomainError, DomainResult, DownloadTask, TranslationTask};

/// Publishes tasks onto the `subtitle.download` and `subtitle.translate`
/// work queues over a dedicated AMQP channel.
pub(crate) struct AmqpTaskQueue {
    channel: Channel,
}

impl AmqpTaskQueue {
    pub(crate) const fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl TaskQueue for AmqpTaskQueue {
    async fn enqueue_download(&self, task: &DownloadTask) -> DomainResult<()> {
        publish_task(&self.channel, DOWNLOAD_QUEUE, task)
            .await
            .map_err(|err| DomainError::transient_infra("enqueue_download", err.to_string()))
    }

    async fn enqueue_translation(&self, task: &TranslationTask) -> DomainResult<()> {
        publish_task(&self.channel, TRANSLATE_QUEUE, task)
            .await
            .map_err(|err| DomainError::transient_infra("enqueue_translation", err.to_string()))
    }
}
