//! In-memory transport for executor and stream tests.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use contentctl_config::Settings;
use url::Url;

use crate::error::TransportError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Replays a fixed script of results, then answers `200 {}`.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// `count` connection failures in a row.
    pub(crate) fn failing(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|_| {
                    Err(TransportError::Request {
                        url: "https://api.example".to_string(),
                        source: Box::new(io::Error::new(
                            io::ErrorKind::ConnectionRefused,
                            "connection refused",
                        )),
                    })
                })
                .collect(),
        )
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
    }
}

/// Settings sending both hosts to `base` with the token `test-token`.
pub(crate) fn settings_for(base: &str) -> Result<Settings, url::ParseError> {
    Ok(Settings::for_single_host(Url::parse(base)?, "test-token"))
}
