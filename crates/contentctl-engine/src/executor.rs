//! Request execution and response normalisation.
//!
//! # Design
//! - Settings are owned by the executor and never change during a run.
//! - Every call ends in exactly one terminal [`Envelope`]; errors are captured
//!   in the envelope, never returned.
//! - Retries follow [`AttemptState`] transitions; intermediate envelopes are
//!   handed to an observer so callers can surface them.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use contentctl_config::Settings;
use contentctl_core::{
    Arguments, BodySource, Descriptor, Envelope, Host, PayloadKind, RateLimit, RequestShape,
};
use serde_json::{Value, json};
use tracing::{Instrument, info_span, warn};
use url::Url;

use crate::error::{RequestError, describe};
use crate::retry::{AttemptState, Outcome, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, Transport};

const AUTHORIZATION: &str = "Authorization";
const GATEWAY_KEY: &str = "apikey";
const CONTENT_TYPE: &str = "Content-Type";
const REDACTED: &str = "<redacted>";

/// Whether requests reach the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Send requests.
    #[default]
    Live,
    /// Render requests into the envelope body without sending them.
    DryRun,
}

/// Executes composed request shapes against the configured hosts.
#[derive(Debug, Clone)]
pub struct Executor<T> {
    transport: T,
    settings: Settings,
    retry: RetryPolicy,
    mode: Mode,
}

impl<T: Transport> Executor<T> {
    /// Executor with the default retry policy in live mode.
    #[must_use]
    pub fn new(transport: T, settings: Settings) -> Self {
        Self {
            transport,
            settings,
            retry: RetryPolicy::default(),
            mode: Mode::Live,
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Switch between live and dry-run execution.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current execution mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Execute `shape` and return the terminal envelope.
    pub async fn execute(
        &self,
        descriptor: &Descriptor,
        shape: &RequestShape,
        arguments: &Arguments,
    ) -> Envelope {
        self.execute_observed(descriptor, shape, arguments, &mut |_: &Envelope| {})
            .await
    }

    /// Execute `shape`, passing every intermediate (`retrying = true`)
    /// envelope to `observer` before the terminal one is returned.
    pub async fn execute_observed(
        &self,
        descriptor: &Descriptor,
        shape: &RequestShape,
        arguments: &Arguments,
        observer: &mut (dyn FnMut(&Envelope) + Send),
    ) -> Envelope {
        let span = info_span!("execute", operation = %descriptor.name);
        self.drive(descriptor, shape, arguments, observer)
            .instrument(span)
            .await
    }

    async fn drive(
        &self,
        descriptor: &Descriptor,
        shape: &RequestShape,
        arguments: &Arguments,
        observer: &mut (dyn FnMut(&Envelope) + Send),
    ) -> Envelope {
        let request = match self.build_request(shape).await {
            Ok(request) => request,
            Err(err) => {
                let mut envelope = blank_envelope(descriptor, arguments);
                envelope.exception = Some(format!("{}: {}", err.kind(), describe(&err)));
                return envelope;
            }
        };

        if self.mode == Mode::DryRun {
            return dry_run_envelope(descriptor, arguments, shape, &request);
        }

        let mut state = AttemptState::start();
        loop {
            state = match state {
                AttemptState::Attempting { attempt } => {
                    let mut envelope = blank_envelope(descriptor, arguments);
                    envelope.url = Some(request.url.to_string());
                    let (outcome, reset) = match self.transport.send(request.clone()).await {
                        Ok(response) => absorb_response(&mut envelope, response),
                        Err(err) => {
                            let message = describe(&err);
                            warn!(attempt, error = %message, "transport failure");
                            envelope.exception = Some(format!("{}: {message}", err.kind()));
                            (Outcome::Transient, None)
                        }
                    };
                    let next = AttemptState::after_attempt(
                        &self.retry,
                        attempt,
                        outcome,
                        &mut envelope,
                        reset,
                    );
                    if envelope.retrying {
                        observer(&envelope);
                    }
                    next
                }
                AttemptState::Retrying { attempt, delay } => {
                    warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    AttemptState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                AttemptState::Succeeded(envelope) | AttemptState::Failed(envelope) => {
                    return envelope;
                }
            };
        }
    }

    async fn build_request(&self, shape: &RequestShape) -> Result<HttpRequest, RequestError> {
        let base = match shape.host {
            Host::Api => &self.settings.base_urls.api,
            Host::Upload => &self.settings.base_urls.upload,
        };
        let url = join_url(base, &shape.path, &shape.query)?;

        let mut headers = BTreeMap::new();
        let credentials = &self.settings.credentials;
        if let Some(token) = &credentials.oauth_token {
            headers.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }
        if let Some(key) = &credentials.gateway_api_key {
            headers.insert(GATEWAY_KEY.to_string(), key.clone());
        }
        headers.extend(shape.headers.clone());

        let body = match &shape.payload {
            None => None,
            Some(payload) => {
                headers.insert(
                    CONTENT_TYPE.to_string(),
                    payload.kind.content_type().to_string(),
                );
                Some(read_source(&payload.source).await?)
            }
        };

        Ok(HttpRequest {
            method: shape.method,
            url,
            headers,
            body,
        })
    }
}

fn join_url(
    base: &Url,
    path: &str,
    query: &BTreeMap<String, String>,
) -> Result<Url, RequestError> {
    let raw = format!("{}{path}", base.as_str().trim_end_matches('/'));
    let mut url = Url::parse(&raw).map_err(|source| RequestError::InvalidUrl {
        url: raw.clone(),
        source,
    })?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query.iter());
    }
    Ok(url)
}

async fn read_source(source: &BodySource) -> Result<Vec<u8>, RequestError> {
    match source {
        BodySource::Inline(bytes) => Ok(bytes.clone()),
        BodySource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|source| RequestError::BodyRead {
                    path: path.clone(),
                    source,
                })
        }
    }
}

fn blank_envelope(descriptor: &Descriptor, arguments: &Arguments) -> Envelope {
    Envelope {
        timestamp: Utc::now(),
        operation: Some(descriptor.name.clone()),
        arguments: arguments.clone(),
        url: None,
        status_code: None,
        body: Value::Null,
        rate_limit: None,
        exception: None,
        attempt: 0,
        retrying: false,
    }
}

/// Copy the response into `envelope`; returns its classification and, for a
/// 429, the server's reset hint.
fn absorb_response(envelope: &mut Envelope, response: HttpResponse) -> (Outcome, Option<u64>) {
    let rate_limit = RateLimit::from_headers(|name| response.header(name));
    let outcome = Outcome::from_status(response.status);
    let reset = if response.status == 429 {
        rate_limit.reset
    } else {
        None
    };
    if outcome != Outcome::Success {
        warn!(status = response.status, "request failed");
    }
    envelope.status_code = Some(response.status);
    envelope.rate_limit = Some(rate_limit);
    envelope.body = normalise_body(&response.body);
    (outcome, reset)
}

/// Parsed JSON when the bytes are JSON, otherwise the text.
fn normalise_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn dry_run_envelope(
    descriptor: &Descriptor,
    arguments: &Arguments,
    shape: &RequestShape,
    request: &HttpRequest,
) -> Envelope {
    let headers: BTreeMap<&str, String> = request
        .headers
        .iter()
        .map(|(name, value)| {
            let shown = match name.as_str() {
                AUTHORIZATION => format!("Bearer {REDACTED}"),
                GATEWAY_KEY => REDACTED.to_string(),
                _ => value.clone(),
            };
            (name.as_str(), shown)
        })
        .collect();
    let data = match (&shape.payload, &request.body) {
        (Some(payload), Some(bytes)) if payload.kind == PayloadKind::Binary => {
            json!({ "base64": STANDARD.encode(bytes) })
        }
        (_, Some(bytes)) => normalise_body(bytes),
        (_, None) => Value::Null,
    };

    let mut envelope = blank_envelope(descriptor, arguments);
    envelope.url = Some(request.url.to_string());
    envelope.body = json!({
        "method": shape.method,
        "data": data,
        "headers": headers,
        "params": shape.query,
    });
    envelope
}
