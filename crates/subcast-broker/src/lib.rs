#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! AMQP transport for the subcast pipeline: the two work queues, the topic
//! exchange and its durable consumer queue, and dead-letter routing after a
//! configurable number of redeliveries.
//!
//! Layout: `connection` (reconnectable connection handle), `topology`
//! (exchange/queue declaration), `work_queue` (publish/consume with
//! prefetch = 1 and redelivery tracking), `event_bus` (the AMQP-backed
//! `subcast_events::EventBus` implementation), `error` (broker error type).

pub mod connection;
pub mod error;
pub mod event_bus;
pub mod topology;
pub mod work_queue;

pub use connection::BrokerConnection;
pub use error::{BrokerError, BrokerResult};
pub use event_bus::AmqpEventBus;
pub use topology::{
    CONSUMER_QUEUE, DEFAULT_MAX_REDELIVERIES, DOWNLOAD_QUEUE, TRANSLATE_QUEUE, dlq_name,
};
pub use work_queue::{RetryOutcome, TaskDelivery, WorkQueueConsumer, publish_task, should_dead_letter};
