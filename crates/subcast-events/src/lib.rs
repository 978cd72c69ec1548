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

//! Typed event envelope, routing keys, and the pluggable event bus
//! abstraction shared by every subcast service.
//!
//! Layout: `payloads` (the `Event` tagged union and `EventEnvelope`),
//! `topics` (routing key derivation and topic binding matching), `bus`
//! (the `EventBus` trait plus an in-memory implementation for tests and
//! tools), `error` (bus error type). The AMQP-backed `EventBus`
//! implementation lives in `subcast-broker`.

pub mod bus;
pub mod error;
pub mod payloads;
pub mod topics;

pub use bus::{BusSubscription, EventBus, InMemoryEventBus};
pub use error::{EventBusError, EventBusResult};
pub use payloads::{Event, EventEnvelope};
pub use topics::{ALL_EVENTS_BINDING, EXCHANGE_NAME, matches_binding, routing_key};
