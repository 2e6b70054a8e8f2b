#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for the Contentful Content Management API.
//!
//! Layout:
//! - `cli.rs`: global flags, dynamic command tree, and dispatch
//! - `commands/`: handlers for single operations, streams, and the registry listing
//! - `client.rs`: CLI error type and the shared application context
//! - `output.rs`: JSON-Lines output targets
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
