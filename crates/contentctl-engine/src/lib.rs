#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Execution engine: turns composed request shapes into HTTP calls, retries
//! transient failures, and replays JSON-Lines streams of operation records.
//!
//! Layout: `transport.rs` (HTTP seam and the reqwest implementation),
//! `retry.rs` (retry policy and attempt state machine), `executor.rs`
//! (request building and envelope normalisation), `sink.rs` (JSON-Lines
//! writers), `stream.rs` (the stream driver).

pub mod error;
pub mod executor;
pub mod retry;
pub mod sink;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use error::{RequestError, StreamError, TransportError};
pub use executor::{Executor, Mode};
pub use retry::{AttemptState, Outcome, RetryPolicy};
pub use sink::{EnvelopeSink, JsonLinesSink};
pub use stream::{StreamDriver, StreamOptions, StreamSummary};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
