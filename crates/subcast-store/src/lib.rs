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

//! The shared key-value store: job records, bounded audit lists,
//! translation checkpoints, and the deduplication layer.
//!
//! Layout: `keys` (key-prefix conventions), `job_store` (the `JobStore`
//! trait and the hash-flattening scheme), `dedup` (fingerprinting and the
//! `DedupStore` trait), `redis_store` (the concrete Redis-backed
//! implementation of both traits), `error` (store error type).

pub mod dedup;
pub mod error;
pub mod job_store;
pub mod keys;
pub mod redis_store;

pub use dedup::{fingerprint, DedupStore, ReserveOutcome, DEFAULT_TTL};
pub use error::{StoreError, StoreResult};
pub use job_store::{AuditEntry, JobStore, DEFAULT_AUDIT_LIMIT};
pub use redis_store::{audit_entry_now, RedisStore};
