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

//! Framework-agnostic media library intake: filesystem watch, webhook, and
//! WebSocket triggers, all normalized through one function into submission
//! requests the orchestrator's HTTP API understands.
//!
//! Layout: `watcher` (debounce/extension filtering, `notify`-backed watch
//! loop), `webhook` (`POST /webhooks/jellyfin` payload handling), `ws`
//! (WebSocket client, reconnect backoff), `resync` (periodic fallback
//! library walk), `intake` (the shared `ScanTrigger -> SubmitRequest`
//! normalization), `error` (scanner error taxonomy).

pub mod error;
pub mod intake;
pub mod resync;
pub mod watcher;
pub mod webhook;
pub mod ws;

pub use error::{ScannerError, ScannerResult};
pub use intake::{ScanTrigger, SubmitRequest, build_submit_request};
pub use watcher::{Debouncer, is_media_file};
pub use webhook::{WebhookOutcome, WebhookPayload, handle_webhook};
pub use ws::{ItemDetails, ItemDetailsFetcher, ReconnectBackoff, WsEvent, parse_ws_text};
