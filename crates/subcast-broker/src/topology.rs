//! Exchange/queue declaration: the two work queues, the topic exchange, and
//! per-queue dead-letter queues.

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};

use crate::error::{BrokerError, BrokerResult};

/// `subtitle.download` work queue name.
pub const DOWNLOAD_QUEUE: &str = "subtitle.download";
/// `subtitle.translate` work queue name.
pub const TRANSLATE_QUEUE: &str = "subtitle.translate";
/// Durable consumer queue the event consumer binds to `#` on.
pub const CONSUMER_QUEUE: &str = "subtitle.events.consumer";

/// Number of redeliveries tolerated before a work-queue task is routed to
/// its dead-letter queue.
pub const DEFAULT_MAX_REDELIVERIES: u32 = 3;

/// Dead-letter queue name for a given work queue.
#[must_use]
pub fn dlq_name(queue: &str) -> String {
    format!("{queue}.dlq")
}

/// Declare a durable work queue plus its dead-letter queue (plain,
/// unbound — messages are routed there explicitly by the consumer, not via
/// broker-native `x-dead-letter-exchange`, since redelivery counting is
/// carried in a message header this crate manages itself).
///
/// # Errors
///
/// Returns an error if any declaration fails.
pub async fn declare_work_queue(channel: &Channel, queue: &str) -> BrokerResult<()> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|source| BrokerError::connection("declare_work_queue", source))?;

    channel
        .queue_declare(
            &dlq_name(queue),
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|source| BrokerError::connection("declare_dlq", source))?;

    Ok(())
}

/// Declare the durable topic exchange events are published to.
///
/// # Errors
///
/// Returns an error if the declaration fails.
pub async fn declare_topic_exchange(channel: &Channel, exchange: &str) -> BrokerResult<()> {
    channel
        .exchange_declare(
            exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..ExchangeDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|source| BrokerError::connection("declare_topic_exchange", source))
}

/// Declare a durable queue bound to `exchange` with the given routing
/// pattern (supports `*`/`#` wildcards).
///
/// # Errors
///
/// Returns an error if the declaration or binding fails.
pub async fn declare_bound_queue(
    channel: &Channel,
    exchange: &str,
    queue: &str,
    binding: &str,
) -> BrokerResult<()> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|source| BrokerError::connection("declare_bound_queue", source))?;

    channel
        .queue_bind(
            queue,
            exchange,
            binding,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|source| BrokerError::connection("bind_queue", source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dlq_name_appends_suffix() {
        assert_eq!(dlq_name(DOWNLOAD_QUEUE), "subtitle.download.dlq");
        assert_eq!(dlq_name(TRANSLATE_QUEUE), "subtitle.translate.dlq");
    }
}
