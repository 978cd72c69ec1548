//! Event bus abstraction.
//!
//! The AMQP-backed implementation (built on `lapin`, publishing to the
//! [`crate::topics::EXCHANGE_NAME`] topic exchange) lives in `subcast-broker`
//! so this crate stays free of a broker dependency; [`InMemoryEventBus`]
//! below is the in-process stand-in used by tests and the `subcast-cli`
//! tool.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::Receiver;
use tracing::error;

use crate::error::{EventBusError, EventBusResult};
use crate::payloads::EventEnvelope;
use crate::topics::{matches_binding, routing_key};

/// Default in-memory replay buffer size.
const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Capability implemented by event bus transports.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an envelope, returning once the transport has accepted it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport rejects or cannot deliver the envelope.
    async fn publish(&self, envelope: EventEnvelope) -> EventBusResult<()>;

    /// Subscribe to envelopes whose routing key matches `binding`
    /// (an AMQP-style topic pattern; see [`crate::topics::matches_binding`]).
    fn subscribe(&self, binding: &str) -> BusSubscription;
}

/// A live subscription to a binding pattern.
pub struct BusSubscription {
    binding: String,
    receiver: Receiver<EventEnvelope>,
}

impl BusSubscription {
    /// Build a subscription from a broadcast receiver, filtering by `binding`.
    ///
    /// Exposed so out-of-crate `EventBus` implementations (the AMQP-backed
    /// bus in `subcast-broker`) can bridge their transport onto the same
    /// subscription type in-process subscribers already use.
    #[must_use]
    pub fn from_receiver(binding: impl Into<String>, receiver: Receiver<EventEnvelope>) -> Self {
        Self {
            binding: binding.into(),
            receiver,
        }
    }

    /// Receive the next envelope whose routing key matches this
    /// subscription's binding, skipping lagged gaps and non-matching events.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => {
                    if matches_binding(routing_key(&envelope.payload), &self.binding) {
                        return Some(envelope);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    error!(skipped, "event bus subscriber lagged; resuming");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// In-process event bus built on `tokio::broadcast`, with a bounded replay
/// buffer for late subscribers (mirroring the revaer platform's SSE bus).
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventEnvelope>,
    replay: Arc<Mutex<VecDeque<EventEnvelope>>>,
    replay_capacity: usize,
}

impl InMemoryEventBus {
    /// Construct a bus with a custom replay/broadcast capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            replay: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default replay capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Snapshot of buffered envelopes matching `binding`, most recent last.
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer mutex has been poisoned.
    #[must_use]
    pub fn replay_matching(&self, binding: &str) -> Vec<EventEnvelope> {
        self.lock_replay()
            .iter()
            .filter(|envelope| matches_binding(routing_key(&envelope.payload), binding))
            .cloned()
            .collect()
    }

    fn lock_replay(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        match self.replay.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event bus replay buffer mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, envelope: EventEnvelope) -> EventBusResult<()> {
        {
            let mut replay = self.lock_replay();
            if replay.len() == self.replay_capacity {
                replay.pop_front();
            }
            replay.push_back(envelope.clone());
        }
        // No subscribers is not an error: publishers should not depend on a
        // live consumer existing, matching durable-queue broker semantics.
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        let kind = envelope.payload.kind();
        let event_id = envelope.event_id;
        self.sender
            .send(envelope)
            .map(|_| ())
            .map_err(|_| EventBusError::Publish {
                event_id,
                event_kind: kind,
                reason: "no active receivers accepted the envelope".into(),
            })
    }

    fn subscribe(&self, binding: &str) -> BusSubscription {
        BusSubscription {
            binding: binding.to_string(),
            receiver: self.sender.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::Event;
    use subcast_domain::JobId;

    fn sample_event(job_id: JobId) -> Event {
        Event::DownloadInProgress { job_id }
    }

    #[tokio::test]
    async fn subscriber_receives_matching_envelope() {
        let bus = InMemoryEventBus::with_capacity(8);
        let mut sub = bus.subscribe("subtitle.#");
        let job_id = JobId::new();
        bus.publish(EventEnvelope::new("downloader", sample_event(job_id)))
            .await
            .expect("publish succeeds");

        let received = sub.recv().await.expect("envelope delivered");
        assert_eq!(received.job_id, Some(job_id));
    }

    #[tokio::test]
    async fn subscriber_ignores_non_matching_routing_keys() {
        let bus = InMemoryEventBus::with_capacity(8);
        let mut sub = bus.subscribe("media.#");
        let job_id = JobId::new();
        bus.publish(EventEnvelope::new("downloader", sample_event(job_id)))
            .await
            .expect("publish succeeds");
        bus.publish(EventEnvelope::new(
            "scanner",
            Event::MediaFileDetected {
                video_path: "/media/x.mkv".into(),
                library_name: "Movies".into(),
            },
        ))
        .await
        .expect("publish succeeds");

        let received = sub.recv().await.expect("media envelope delivered");
        assert!(matches!(received.payload, Event::MediaFileDetected { .. }));
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus = InMemoryEventBus::new();
        let job_id = JobId::new();
        bus.publish(EventEnvelope::new("downloader", sample_event(job_id)))
            .await
            .expect("publish without subscribers is not an error");
    }

    #[test]
    fn replay_matching_filters_by_binding() {
        let bus = InMemoryEventBus::with_capacity(4);
        let job_id = JobId::new();
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            bus.publish(EventEnvelope::new("downloader", sample_event(job_id)))
                .await
                .unwrap();
            bus.publish(EventEnvelope::new(
                "scanner",
                Event::MediaFileDetected {
                    video_path: "/media/x.mkv".into(),
                    library_name: "Movies".into(),
                },
            ))
            .await
            .unwrap();
        });

        let matched = bus.replay_matching("subtitle.#");
        assert_eq!(matched.len(), 1);
        assert!(matches!(matched[0].payload, Event::DownloadInProgress { .. }));
    }
}
