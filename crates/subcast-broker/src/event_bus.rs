//! AMQP-backed [`EventBus`] implementation.
//!
//! Publishes land on the durable `subtitle.events` topic exchange with a
//! routing key derived from the event kind. A single durable queue
//! (`subtitle.events.consumer`, bound to `#`) is consumed in the background
//! and rebroadcast over an in-process `tokio::broadcast` channel, so
//! `subscribe` returns the same [`BusSubscription`] type in-process
//! subscribers already use.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicPublishOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel};
use subcast_events::{BusSubscription, Event, EventBus, EventBusError, EventBusResult, EventEnvelope};
use tokio::sync::broadcast;
use tracing::{error, warn};

use crate::error::BrokerResult;
use crate::topology::{CONSUMER_QUEUE, declare_bound_queue, declare_topic_exchange};

const ALL_EVENTS_BINDING: &str = "#";
const REPLAY_CAPACITY: usize = 1_024;

/// Event bus backed by a durable topic exchange.
pub struct AmqpEventBus {
    channel: Channel,
    exchange: Arc<str>,
    broadcast: broadcast::Sender<EventEnvelope>,
}

impl AmqpEventBus {
    /// Declare the exchange and this bus's durable consumer queue, start the
    /// background rebroadcast task, and return the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if topology declaration or consumer startup fails.
    pub async fn connect(channel: Channel, exchange: impl Into<Arc<str>>) -> BrokerResult<Self> {
        let exchange = exchange.into();
        declare_topic_exchange(&channel, &exchange).await?;
        declare_bound_queue(&channel, &exchange, CONSUMER_QUEUE, ALL_EVENTS_BINDING).await?;

        let (sender, _) = broadcast::channel(REPLAY_CAPACITY);
        let bus = Self {
            channel,
            exchange,
            broadcast: sender,
        };
        bus.spawn_rebroadcast_task().await?;
        Ok(bus)
    }

    async fn spawn_rebroadcast_task(&self) -> BrokerResult<()> {
        let mut consumer = self
            .channel
            .basic_consume(
                CONSUMER_QUEUE,
                "subtitle-events-rebroadcast",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|source| crate::error::BrokerError::connection("consume_events", source))?;

        let sender = self.broadcast.clone();
        tokio::spawn(async move {
            while let Some(delivery) = consumer.next().await {
                let Ok(delivery) = delivery else {
                    error!("event bus consumer stream errored");
                    continue;
                };
                match serde_json::from_slice::<EventEnvelope>(&delivery.data) {
                    Ok(envelope) => {
                        let _ = sender.send(envelope);
                    }
                    Err(err) => {
                        error!(error = %err, "failed to decode event envelope from broker");
                    }
                }
                if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                    warn!(error = %err, "failed to ack event delivery");
                }
            }
        });

        Ok(())
    }
}

#[async_trait]
impl EventBus for AmqpEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> EventBusResult<()> {
        let routing_key = routing_key_for(&envelope.payload);
        let event_id = envelope.event_id;
        let kind = envelope.payload.kind();
        let body = serde_json::to_vec(&envelope).map_err(|err| EventBusError::Publish {
            event_id,
            event_kind: kind,
            reason: err.to_string(),
        })?;

        self.channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await
            .map_err(|err| EventBusError::Publish {
                event_id,
                event_kind: kind,
                reason: err.to_string(),
            })?
            .await
            .map_err(|err| EventBusError::Publish {
                event_id,
                event_kind: kind,
                reason: err.to_string(),
            })?;
        Ok(())
    }

    fn subscribe(&self, binding: &str) -> BusSubscription {
        BusSubscription::from_receiver(binding, self.broadcast.subscribe())
    }
}

fn routing_key_for(event: &Event) -> &'static str {
    subcast_events::routing_key(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_key_delegates_to_shared_derivation() {
        let job_id = subcast_domain::JobId::new();
        let event = Event::DownloadInProgress { job_id };
        assert_eq!(routing_key_for(&event), "subtitle.download.in_progress");
    }
}
