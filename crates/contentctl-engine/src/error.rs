//! Error types for request execution and streaming.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error used where the transport backend is pluggable.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures raised by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The request did not produce a complete response.
    #[error("request to {url} failed")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },
    /// A header name or value could not be sent.
    #[error("invalid header '{name}'")]
    InvalidHeader {
        /// Offending header name.
        name: String,
    },
}

impl TransportError {
    /// Stable identifier used in envelope `exception` strings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        "TransportError"
    }
}

/// Failures while turning a request shape into a concrete request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The payload file could not be read.
    #[error("failed to read payload file '{}'", path.display())]
    BodyRead {
        /// File named by `document_file`.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Base URL and rendered path did not combine into a valid URL.
    #[error("invalid request URL '{url}'")]
    InvalidUrl {
        /// Attempted URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

impl RequestError {
    /// Stable identifier used in envelope `exception` strings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        "RequestError"
    }
}

/// Failures that stop a stream run.
///
/// Per-record problems never surface here; they become envelopes.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The input source failed while reading a line.
    #[error("failed to read stream input")]
    Source {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An output sink rejected a write.
    #[error("failed to write to output sink")]
    Sink {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A value could not be encoded as JSON.
    #[error("failed to encode output line")]
    Encode {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Render `error` and its sources as `outer: inner: innermost`.
pub(crate) fn describe(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
