//! Error types for registry construction, argument contracts, and record decoding.

use thiserror::Error;

use crate::flag::Flag;

/// Raised while building a [`crate::Registry`]. These are configuration
/// mistakes in the operation table and are fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// Two rows share the same operation name.
    #[error("duplicate operation '{name}'")]
    DuplicateOperation {
        /// Name registered twice.
        name: String,
    },
    /// A flag letter in the table does not map to any [`Flag`].
    #[error("operation '{operation}' uses unknown flag letter '{letter}'")]
    UnknownFlag {
        /// Operation carrying the bad letter.
        operation: String,
        /// Offending letter.
        letter: char,
    },
    /// Two flags on the same descriptor contribute to the same part of the request.
    #[error("operation '{operation}' combines conflicting flags '{first}' and '{second}'")]
    ConflictingFlags {
        /// Operation carrying both flags.
        operation: String,
        /// First flag claiming the contested slot.
        first: Flag,
        /// Second flag claiming the contested slot.
        second: Flag,
    },
    /// The URL template could not be parsed.
    #[error("operation '{operation}' has an invalid URL template: {reason}")]
    InvalidTemplate {
        /// Operation carrying the template.
        operation: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A descriptor combines a flag with a host or template it cannot work with.
    #[error("operation '{operation}' is misconfigured: {reason}")]
    IncompatibleFlag {
        /// Operation carrying the flag.
        operation: String,
        /// Flag that cannot be honoured.
        flag: Flag,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The placeholder pattern failed to compile.
    #[error("failed to compile the URL placeholder pattern")]
    Pattern {
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Caller-input violations detected before any network call.
///
/// None of these are retryable: the same input fails the same way again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The operation name is not registered.
    #[error("operation '{name}' is not recognized")]
    UnknownOperation {
        /// Name the caller asked for.
        name: String,
    },
    /// A URL placeholder argument was not supplied.
    #[error("missing required argument '{name}'")]
    MissingArgument {
        /// Argument name.
        name: String,
    },
    /// Neither `document_file` nor `document_body` was supplied.
    #[error("specify document_file or document_body")]
    MissingBody,
    /// Both `document_file` and `document_body` were supplied.
    #[error("specify only one of document_file or document_body")]
    AmbiguousBody,
    /// The operation requires `document_version`.
    #[error("missing required argument 'document_version'")]
    MissingVersion,
    /// The operation requires a `content_type` discriminator.
    #[error("missing required argument 'content_type'")]
    MissingContentType,
    /// A destructive operation was invoked without an explicit force choice.
    #[error("operation '{operation}' is destructive and needs an explicit force or no-force choice")]
    ConfirmationRequired {
        /// Operation that was refused.
        operation: String,
    },
    /// An argument was present but had the wrong shape.
    #[error("invalid value for argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ContractError {
    /// Stable identifier used in envelope `exception` strings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownOperation { .. } => "UnknownOperation",
            Self::MissingArgument { .. } => "MissingArgument",
            Self::MissingBody => "MissingBody",
            Self::AmbiguousBody => "AmbiguousBody",
            Self::MissingVersion => "MissingVersion",
            Self::MissingContentType => "MissingContentType",
            Self::ConfirmationRequired { .. } => "ConfirmationRequired",
            Self::InvalidArgument { .. } => "InvalidArgument",
        }
    }

    pub(crate) fn invalid(name: &str, reason: &'static str) -> Self {
        Self::InvalidArgument {
            name: name.to_string(),
            reason,
        }
    }
}

/// A stream line that could not be turned into an operation record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The line is not valid JSON.
    #[error("malformed JSON: {source}")]
    Malformed {
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8: {source}")]
    InvalidUtf8 {
        /// Position of the first invalid byte.
        #[source]
        source: std::str::Utf8Error,
    },
    /// The line is JSON but not an object.
    #[error("record must be a JSON object")]
    NotAnObject,
    /// The object carries no string `operation` field.
    #[error("record has no 'operation' name")]
    MissingOperation,
    /// The `arguments` field is present but not an object.
    #[error("record 'arguments' must be a JSON object")]
    InvalidArguments,
}

impl DecodeError {
    /// Stable identifier used in envelope `exception` strings.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        "DecodeError"
    }
}
