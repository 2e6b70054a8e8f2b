//! Typed runtime settings.
//!
//! # Design
//! - Settings are assembled once at startup and passed by reference.
//! - Secrets never appear in `Debug` output.

use std::fmt;

use url::Url;

use crate::defaults::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL};
use crate::error::{ConfigError, ConfigResult};

/// Base URLs for the two hosts the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    /// Content management API.
    pub api: Url,
    /// Upload API, used for binary payloads.
    pub upload: Url,
}

impl BaseUrls {
    /// Parse and validate both base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] or [`ConfigError::UnsupportedScheme`]
    /// for the first value that is not an absolute `http(s)` URL.
    pub fn parse(api: &str, upload: &str) -> ConfigResult<Self> {
        Ok(Self {
            api: parse_base_url("api", api)?,
            upload: parse_base_url("upload", upload)?,
        })
    }

    /// The public Contentful hosts.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in constants stop being valid URLs.
    pub fn standard() -> ConfigResult<Self> {
        Self::parse(DEFAULT_API_URL, DEFAULT_UPLOAD_URL)
    }
}

fn parse_base_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme {
            field,
            value: value.to_string(),
        }),
    }
}

/// Authentication material attached to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token for the `Authorization` header.
    pub oauth_token: Option<String>,
    /// Optional gateway key sent as `apikey`.
    pub gateway_api_key: Option<String>,
}

impl Credentials {
    /// Credentials with only an OAuth token.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            oauth_token: Some(token.into()),
            gateway_api_key: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("oauth_token", &redact(&self.oauth_token))
            .field("gateway_api_key", &redact(&self.gateway_api_key))
            .finish()
    }
}

/// Values supplied on the command line or through the environment.
///
/// Each populated field takes precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Replacement API base URL.
    pub api_url: Option<String>,
    /// Replacement upload base URL.
    pub upload_url: Option<String>,
    /// Credentials to use.
    pub credentials: Credentials,
}

/// Everything the executor needs to reach the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Hosts to send requests to.
    pub base_urls: BaseUrls,
    /// Authentication material.
    pub credentials: Credentials,
}

impl Settings {
    /// Settings pointing both hosts at `base` with a bearer token. Handy for
    /// local servers and tests.
    #[must_use]
    pub fn for_single_host(base: Url, token: impl Into<String>) -> Self {
        Self {
            base_urls: BaseUrls {
                api: base.clone(),
                upload: base,
            },
            credentials: Credentials::bearer(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_public_hosts() {
        let urls = BaseUrls::standard().expect("built-in URLs parse");
        assert_eq!(urls.api.as_str(), "https://api.contentful.com/");
        assert_eq!(urls.upload.as_str(), "https://upload.contentful.com/");
    }

    #[test]
    fn parse_rejects_relative_and_non_http_urls() {
        let err = BaseUrls::parse("not a url", DEFAULT_UPLOAD_URL).expect_err("relative");
        assert!(matches!(err, ConfigError::InvalidUrl { field: "api", .. }));

        let err = BaseUrls::parse(DEFAULT_API_URL, "ftp://upload.example").expect_err("ftp");
        assert!(matches!(
            err,
            ConfigError::UnsupportedScheme { field: "upload", .. }
        ));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials {
            oauth_token: Some("CFPAT-secret".to_string()),
            gateway_api_key: None,
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("CFPAT-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("gateway_api_key: None"));
    }
}
