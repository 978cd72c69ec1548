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

//! The orchestrator's HTTP surface: `submit_download`, `submit_translation`,
//! `get_status`, `get_events`, and `health`, built as an axum router.
//!
//! Layout: `dto` (request/response bodies), `error` (`ApiError` and its JSON
//! shape), `queue` (the `TaskQueue` work-dispatch capability), `state`
//! (shared `ApiState`), `handlers` (the five operations), `telemetry` (HTTP
//! request metrics middleware), `router` (`ApiServer`, route table, server host).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod queue;
pub mod router;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ErrorBody};
pub use queue::TaskQueue;
pub use router::ApiServer;
pub use state::{ApiState, EVENT_SOURCE};
