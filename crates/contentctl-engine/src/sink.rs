//! Append-only JSON-Lines sinks.

use async_trait::async_trait;
use contentctl_core::{Envelope, encode_line};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::StreamError;

/// Destination accepting one envelope at a time.
#[async_trait]
pub trait EnvelopeSink: Send {
    /// Append `envelope`. A returned `Ok` means the whole line was written.
    async fn write(&mut self, envelope: &Envelope) -> Result<(), StreamError>;
}

/// Writes one JSON object per line and flushes after every line, so an
/// interrupted run never leaves a partial record behind.
pub struct JsonLinesSink<W> {
    writer: W,
    echo: Option<Box<dyn AsyncWrite + Unpin + Send>>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Sink writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self { writer, echo: None }
    }

    /// Also copy every line to `echo` (typically stdout when `writer` is a file).
    #[must_use]
    pub fn echo_to(mut self, echo: impl AsyncWrite + Unpin + Send + 'static) -> Self {
        self.echo = Some(Box::new(echo));
        self
    }

    /// Append any serialisable value as one line.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Encode`] if `value` is not representable as JSON
    /// and [`StreamError::Sink`] if a writer fails.
    pub async fn write_value<T: Serialize + Sync + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), StreamError> {
        let mut line = encode_line(value).map_err(|source| StreamError::Encode { source })?;
        line.push('\n');
        write_line(&mut self.writer, &line).await?;
        if let Some(echo) = self.echo.as_mut() {
            write_line(echo, &line).await?;
        }
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

async fn write_line<W: AsyncWrite + Unpin + ?Sized>(
    writer: &mut W,
    line: &str,
) -> Result<(), StreamError> {
    writer
        .write_all(line.as_bytes())
        .await
        .map_err(|source| StreamError::Sink { source })?;
    writer
        .flush()
        .await
        .map_err(|source| StreamError::Sink { source })
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EnvelopeSink for JsonLinesSink<W> {
    async fn write(&mut self, envelope: &Envelope) -> Result<(), StreamError> {
        self.write_value(envelope).await
    }
}

#[async_trait]
impl EnvelopeSink for Vec<Envelope> {
    async fn write(&mut self, envelope: &Envelope) -> Result<(), StreamError> {
        self.push(envelope.clone());
        Ok(())
    }
}
