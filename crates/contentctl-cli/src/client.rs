//! CLI error type and the context shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use contentctl_config::Settings;
use contentctl_core::Registry;
use contentctl_engine::{Executor, Mode, ReqwestTransport, RetryPolicy};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) registry: Registry,
    pub(crate) settings: Settings,
    pub(crate) timeout: Duration,
    pub(crate) retry: RetryPolicy,
}

impl AppContext {
    /// Executor for `mode`. Live execution needs an OAuth token; dry runs do not.
    pub(crate) fn executor(&self, mode: Mode) -> CliResult<Executor<ReqwestTransport>> {
        if mode == Mode::Live && self.settings.credentials.oauth_token.is_none() {
            return Err(CliError::validation(
                "missing OAuth token: pass --oauth-token or set CONTENTFUL_OAUTH_TOKEN",
            ));
        }
        let transport = ReqwestTransport::new(self.timeout).map_err(CliError::failure)?;
        Ok(Executor::new(transport, self.settings.clone())
            .with_retry(self.retry)
            .with_mode(mode))
    }
}
