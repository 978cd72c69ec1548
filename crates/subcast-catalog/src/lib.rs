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

//! `SubtitleCatalog` adapter, content hashing, and bounded retry/backoff.
//!
//! Layout: `hash` (OpenSubtitles content hash), `backoff` (retry helper),
//! `opensubtitles` (the concrete `SubtitleCatalog` implementation), `error`
//! (catalog error taxonomy).

pub mod backoff;
pub mod error;
pub mod hash;
pub mod opensubtitles;

pub use backoff::{delay_for_attempt, retry_with_backoff};
pub use error::{CatalogError, CatalogResult};
pub use hash::hash_file;
pub use opensubtitles::OpenSubtitlesCatalog;
