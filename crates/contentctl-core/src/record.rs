//! Operation records, response envelopes, and their JSON-Lines encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::arguments::Arguments;
use crate::error::DecodeError;

/// One operation to perform: a name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Registered operation name.
    pub operation: String,
    /// Named arguments.
    #[serde(default)]
    pub arguments: Arguments,
}

impl OperationRecord {
    /// Record for `operation` with `arguments`.
    #[must_use]
    pub fn new(operation: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            operation: operation.into(),
            arguments,
        }
    }
}

/// Rate-limit counters reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// `X-Contentful-RateLimit-Hour-Limit`
    pub hour_limit: Option<u64>,
    /// `X-Contentful-RateLimit-Hour-Remaining`
    pub hour_remaining: Option<u64>,
    /// `X-Contentful-RateLimit-Second-Limit`
    pub second_limit: Option<u64>,
    /// `X-Contentful-RateLimit-Second-Remaining`
    pub second_remaining: Option<u64>,
    /// `X-Contentful-RateLimit-Reset`, seconds until the window resets.
    pub reset: Option<u64>,
}

impl RateLimit {
    /// Parse the `X-Contentful-RateLimit-*` headers, looked up case-insensitively
    /// through `header`. Missing or non-numeric values become `None`.
    pub fn from_headers<'a>(header: impl Fn(&str) -> Option<&'a str>) -> Self {
        let read = |suffix: &str| {
            header(&format!("x-contentful-ratelimit-{suffix}"))
                .and_then(|value| value.trim().parse::<u64>().ok())
        };
        Self {
            hour_limit: read("hour-limit"),
            hour_remaining: read("hour-remaining"),
            second_limit: read("second-limit"),
            second_remaining: read("second-remaining"),
            reset: read("reset"),
        }
    }
}

/// Normalised result of one operation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// When the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Operation name; `None` when the input line could not be decoded.
    pub operation: Option<String>,
    /// Arguments as supplied.
    #[serde(default)]
    pub arguments: Arguments,
    /// Final request URL, when a request was built.
    pub url: Option<String>,
    /// Transport status, when a response was obtained.
    pub status_code: Option<u16>,
    /// Response body: parsed JSON when possible, otherwise text.
    #[serde(default)]
    pub body: Value,
    /// Rate-limit counters from the response.
    pub rate_limit: Option<RateLimit>,
    /// `"<Kind>: <message>"` when the attempt ended before a status code.
    pub exception: Option<String>,
    /// Zero-based attempt number.
    pub attempt: u32,
    /// Whether another attempt follows this one.
    pub retrying: bool,
}

impl Envelope {
    /// Envelope for a record that never reached the network.
    #[must_use]
    pub fn rejected(
        operation: Option<String>,
        arguments: Arguments,
        kind: &str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            arguments,
            url: None,
            status_code: None,
            body: Value::Null,
            rate_limit: None,
            exception: Some(format!("{kind}: {message}")),
            attempt: 0,
            retrying: false,
        }
    }

    /// Envelope for a stream line that could not be decoded.
    #[must_use]
    pub fn undecodable(error: &DecodeError) -> Self {
        Self::rejected(None, Arguments::new(), error.kind(), error)
    }

    /// A 2xx status was obtained.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exception.is_none() && self.status_code.is_some_and(|code| (200..300).contains(&code))
    }

    /// An exception was recorded or a non-2xx status was obtained.
    ///
    /// Dry-run envelopes carry neither and count as neither success nor failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.exception.is_some()
            || self
                .status_code
                .is_some_and(|code| !(200..300).contains(&code))
    }

    /// The record this envelope was produced for, if it names an operation.
    #[must_use]
    pub fn to_record(&self) -> Option<OperationRecord> {
        self.operation
            .as_ref()
            .map(|operation| OperationRecord::new(operation.clone(), self.arguments.clone()))
    }
}

/// Encode any serialisable value as a single JSON line (no trailing newline).
///
/// # Errors
///
/// Returns the serializer error when `value` cannot be represented as JSON.
pub fn encode_line<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Encode an envelope as a single JSON line (no trailing newline).
///
/// # Errors
///
/// Returns the serializer error when the envelope cannot be represented as JSON.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, serde_json::Error> {
    encode_line(envelope)
}

/// Decode one stream line into an operation record.
///
/// Only `operation` and `arguments` are read; any other field is ignored, so a
/// previously emitted envelope replays as its own record.
///
/// # Errors
///
/// Returns a [`DecodeError`] for malformed JSON, non-object lines, a missing
/// operation name, or non-object arguments.
pub fn decode_record(line: &str) -> Result<OperationRecord, DecodeError> {
    let value: Value =
        serde_json::from_str(line).map_err(|source| DecodeError::Malformed { source })?;
    let Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject);
    };
    let operation = match object.remove("operation") {
        Some(Value::String(operation)) => operation,
        _ => return Err(DecodeError::MissingOperation),
    };
    let arguments = match object.remove("arguments") {
        None | Some(Value::Null) => Arguments::new(),
        Some(Value::Object(map)) => Arguments::from(map),
        Some(_) => return Err(DecodeError::InvalidArguments),
    };
    Ok(OperationRecord::new(operation, arguments))
}

/// Decode one raw stream line. Bytes that are not UTF-8 are reported as a
/// [`DecodeError`] for this line only.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidUtf8`] or any error of [`decode_record`].
pub fn decode_record_bytes(line: &[u8]) -> Result<OperationRecord, DecodeError> {
    let text = std::str::from_utf8(line).map_err(|source| DecodeError::InvalidUtf8 { source })?;
    decode_record(text)
}
