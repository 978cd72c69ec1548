//! Work-queue publish/consume with prefetch = 1 and header-tracked
//! redelivery counting.
//!
//! Redeliveries are not counted via AMQP's `redelivered` flag (it is a
//! boolean, not a counter) or native `x-death` headers (populated only by
//! broker-native dead-lettering). Instead this module stamps an
//! `x-redelivery-count` header on every republish, so [`TaskDelivery::retry`]
//! and [`TaskDelivery::dead_letter`] can make the routing decision
//! deterministically from the delivery alone.

use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, BasicRejectOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BrokerError, BrokerResult};
use crate::topology::{DEFAULT_MAX_REDELIVERIES, dlq_name};

const REDELIVERY_HEADER: &str = "x-redelivery-count";

/// Publish `task` onto `queue` as a persistent message.
///
/// # Errors
///
/// Returns an error if serialization or the publish call fails.
pub async fn publish_task<T: Serialize>(
    channel: &Channel,
    queue: &'static str,
    task: &T,
) -> BrokerResult<()> {
    let body = serde_json::to_vec(task).map_err(|err| BrokerError::encode(queue, err.to_string()))?;
    channel
        .basic_publish(
            "",
            queue,
            BasicPublishOptions::default(),
            &body,
            BasicProperties::default().with_delivery_mode(2),
        )
        .await
        .map_err(|source| BrokerError::connection("publish_task", source))?
        .await
        .map_err(|source| BrokerError::connection("publish_task_confirm", source))?;
    Ok(())
}

/// A consumer bound to a single work queue with prefetch = 1.
pub struct WorkQueueConsumer {
    channel: Channel,
    queue: &'static str,
    max_redeliveries: u32,
    inner: lapin::Consumer,
}

impl WorkQueueConsumer {
    /// Start consuming `queue` on a fresh channel derived from `channel`,
    /// with prefetch = 1 (one in-flight task per replica).
    ///
    /// # Errors
    ///
    /// Returns an error if QoS configuration or `basic_consume` fails.
    pub async fn start(
        channel: Channel,
        queue: &'static str,
        consumer_tag: &str,
    ) -> BrokerResult<Self> {
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|source| BrokerError::connection("set_prefetch", source))?;

        let inner = channel
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|source| BrokerError::connection("basic_consume", source))?;

        Ok(Self {
            channel,
            queue,
            max_redeliveries: DEFAULT_MAX_REDELIVERIES,
            inner,
        })
    }

    /// Override the default redelivery budget before the DLQ routing kicks in.
    #[must_use]
    pub const fn with_max_redeliveries(mut self, max_redeliveries: u32) -> Self {
        self.max_redeliveries = max_redeliveries;
        self
    }

    /// Await the next delivery, decoded as `T`.
    ///
    /// Returns `Ok(None)` when the consumer stream ends (channel closed).
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery cannot be decoded or the underlying
    /// stream reports an error.
    pub async fn next<T: DeserializeOwned>(&mut self) -> BrokerResult<Option<TaskDelivery<T>>> {
        let Some(delivery) = self.inner.next().await else {
            return Ok(None);
        };
        let delivery = delivery.map_err(|source| BrokerError::connection("consume", source))?;

        let redelivery_count = read_redelivery_count(delivery.properties.headers());
        let task: T = serde_json::from_slice(&delivery.data)
            .map_err(|err| BrokerError::decode(self.queue, err.to_string()))?;

        Ok(Some(TaskDelivery {
            channel: self.channel.clone(),
            queue: self.queue,
            max_redeliveries: self.max_redeliveries,
            redelivery_count,
            delivery,
            task,
        }))
    }
}

/// One decoded delivery from a work queue, paired with the raw AMQP
/// delivery needed to ack/retry/dead-letter it.
pub struct TaskDelivery<T> {
    channel: Channel,
    queue: &'static str,
    max_redeliveries: u32,
    /// Number of times this logical task has already been redelivered.
    pub redelivery_count: u32,
    delivery: lapin::message::Delivery,
    /// The decoded task payload.
    pub task: T,
}

impl<T> TaskDelivery<T> {
    /// Acknowledge terminal success.
    ///
    /// # Errors
    ///
    /// Returns an error if the ack fails.
    pub async fn ack(self) -> BrokerResult<()> {
        self.delivery
            .ack(BasicAckOptions::default())
            .await
            .map_err(|source| BrokerError::connection("ack", source))
    }

    /// Retry if under the redelivery budget, otherwise route to the dead
    /// letter queue. Either way the original delivery is acked (a fresh
    /// message carries the incremented counter, or none at all for the DLQ).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any broker call fails.
    pub async fn retry_or_dead_letter(self) -> BrokerResult<RetryOutcome>
    where
        T: Serialize,
    {
        if should_dead_letter(self.redelivery_count, self.max_redeliveries) {
            let body = serde_json::to_vec(&self.task)
                .map_err(|err| BrokerError::encode(self.queue, err.to_string()))?;
            self.channel
                .basic_publish(
                    "",
                    &dlq_name(self.queue),
                    BasicPublishOptions::default(),
                    &body,
                    BasicProperties::default().with_delivery_mode(2),
                )
                .await
                .map_err(|source| BrokerError::connection("publish_dlq", source))?
                .await
                .map_err(|source| BrokerError::connection("publish_dlq_confirm", source))?;
            self.delivery
                .ack(BasicAckOptions::default())
                .await
                .map_err(|source| BrokerError::connection("ack_after_dlq", source))?;
            return Ok(RetryOutcome::DeadLettered);
        }

        let body = serde_json::to_vec(&self.task)
            .map_err(|err| BrokerError::encode(self.queue, err.to_string()))?;
        let properties = BasicProperties::default()
            .with_delivery_mode(2)
            .with_headers(with_incremented_redelivery(
                self.delivery.properties.headers(),
            ));
        self.channel
            .basic_publish(
                "",
                self.queue,
                BasicPublishOptions::default(),
                &body,
                properties,
            )
            .await
            .map_err(|source| BrokerError::connection("republish_retry", source))?
            .await
            .map_err(|source| BrokerError::connection("republish_retry_confirm", source))?;
        self.delivery
            .ack(BasicAckOptions::default())
            .await
            .map_err(|source| BrokerError::connection("ack_after_retry", source))?;
        Ok(RetryOutcome::Requeued)
    }

    /// Reject without requeue, bypassing the redelivery counter (used for
    /// non-retryable catalog/validation failures the spec says should fail
    /// immediately rather than exhaust the retry budget).
    ///
    /// # Errors
    ///
    /// Returns an error if the reject call fails.
    pub async fn reject(self) -> BrokerResult<()> {
        self.delivery
            .reject(BasicRejectOptions { requeue: false })
            .await
            .map_err(|source| BrokerError::connection("reject", source))
    }
}

/// Outcome of [`TaskDelivery::retry_or_dead_letter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The task was republished with an incremented redelivery counter.
    Requeued,
    /// The redelivery budget was exhausted; the task moved to the DLQ.
    DeadLettered,
}

/// Whether a task at `redelivery_count` should be dead-lettered rather than
/// retried again.
#[must_use]
pub const fn should_dead_letter(redelivery_count: u32, max_redeliveries: u32) -> bool {
    redelivery_count >= max_redeliveries
}

fn read_redelivery_count(headers: &Option<FieldTable>) -> u32 {
    let Some(headers) = headers else {
        return 0;
    };
    match headers.inner().get(REDELIVERY_HEADER) {
        Some(AMQPValue::LongLongInt(value)) => u32::try_from(*value).unwrap_or(u32::MAX),
        _ => 0,
    }
}

fn with_incremented_redelivery(headers: &Option<FieldTable>) -> FieldTable {
    let current = read_redelivery_count(headers);
    let mut table = headers.clone().unwrap_or_default();
    table.insert(
        REDELIVERY_HEADER.into(),
        AMQPValue::LongLongInt(i64::from(current + 1)),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_letters_once_budget_exhausted() {
        assert!(!should_dead_letter(0, DEFAULT_MAX_REDELIVERIES));
        assert!(!should_dead_letter(2, DEFAULT_MAX_REDELIVERIES));
        assert!(should_dead_letter(3, DEFAULT_MAX_REDELIVERIES));
        assert!(should_dead_letter(10, DEFAULT_MAX_REDELIVERIES));
    }

    #[test]
    fn redelivery_header_round_trips() {
        let initial = read_redelivery_count(&None);
        assert_eq!(initial, 0);

        let incremented = with_incremented_redelivery(&None);
        assert_eq!(read_redelivery_count(&Some(incremented.clone())), 1);

        let twice = with_incremented_redelivery(&Some(incremented));
        assert_eq!(read_redelivery_count(&Some(twice)), 2);
    }
}
