//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while assembling [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file '{}'", path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid JSON for the expected layout.
    #[error("invalid configuration file '{}'", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A base URL could not be parsed.
    #[error("invalid URL for {field}: '{value}'")]
    InvalidUrl {
        /// Setting that carried the value.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// A base URL used a scheme other than `http` or `https`.
    #[error("unsupported scheme for {field}: '{value}'")]
    UnsupportedScheme {
        /// Setting that carried the value.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_name_the_offending_input() {
        let err = ConfigError::Io {
            path: PathBuf::from("/tmp/contentctl.json"),
            source: io::Error::other("denied"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read configuration file '/tmp/contentctl.json'"
        );
        assert!(err.source().is_some());

        let err = ConfigError::UnsupportedScheme {
            field: "api",
            value: "ftp://example.com".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported scheme for api: 'ftp://example.com'");
        assert!(err.source().is_none());
    }
}
