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

//! Operator CLI for the orchestrator's HTTP surface.
//!
//! Layout: `client` (`AppContext`, `CliError`, HTTP plumbing shared by every
//! command), `output` (table/JSON renderers), `cli` (argument parsing and
//! command dispatch) with a thin `main.rs` that delegates to [`cli::run`].

pub mod cli;
pub mod client;
pub mod output;

pub use cli::run;
