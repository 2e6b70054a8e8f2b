//! Stream driver: replays JSON-Lines operation records through the executor.
//!
//! Records are processed strictly in order, one at a time. Every non-blank
//! input line yields exactly one terminal envelope on the output sink, written
//! and flushed before the next line is read. Lines arrive as raw bytes so a
//! line that is not UTF-8 fails on its own instead of ending the run.

use std::future::{Future, pending};
use std::io;

use contentctl_core::{
    Arguments, ContractError, Envelope, OperationRecord, Registry, compose, decode_record_bytes,
};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::executor::Executor;
use crate::sink::EnvelopeSink;
use crate::transport::Transport;

/// Per-run knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Write intermediate `retrying = true` envelopes before each terminal one.
    pub surface_attempts: bool,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Records that produced a terminal envelope.
    pub processed: usize,
    /// Terminal envelopes that were failures.
    pub failed: usize,
    /// The run stopped early because shutdown was requested.
    pub interrupted: bool,
}

/// Drives a sequence of records through registry lookup, composition, and
/// execution.
pub struct StreamDriver<'r, T> {
    registry: &'r Registry,
    executor: Executor<T>,
    options: StreamOptions,
}

impl<'r, T: Transport> StreamDriver<'r, T> {
    /// Driver over `registry` using `executor`.
    #[must_use]
    pub const fn new(registry: &'r Registry, executor: Executor<T>, options: StreamOptions) -> Self {
        Self {
            registry,
            executor,
            options,
        }
    }

    /// Process every line of `input` until it ends.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] only when the source or a sink fails; record
    /// level problems are written as envelopes.
    pub async fn run<S>(
        &self,
        input: S,
        output: &mut dyn EnvelopeSink,
        errors: Option<&mut dyn EnvelopeSink>,
    ) -> Result<StreamSummary, StreamError>
    where
        S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
    {
        self.run_until(input, output, errors, pending()).await
    }

    /// Like [`run`](Self::run), but stops before reading the next line once
    /// `shutdown` resolves. The in-flight record always completes.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] only when the source or a sink fails.
    pub async fn run_until<S, F>(
        &self,
        mut input: S,
        output: &mut dyn EnvelopeSink,
        mut errors: Option<&mut dyn EnvelopeSink>,
        shutdown: F,
    ) -> Result<StreamSummary, StreamError>
    where
        S: Stream<Item = io::Result<Vec<u8>>> + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = StreamSummary::default();

        loop {
            let next = tokio::select! {
                biased;
                () = &mut shutdown => {
                    warn!(processed = summary.processed, "stream interrupted");
                    summary.interrupted = true;
                    break;
                }
                line = input.next() => line,
            };
            let Some(line) = next else { break };
            let line = line.map_err(|source| StreamError::Source { source })?;
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let (attempts, terminal) = self.process(line).await;
            for envelope in &attempts {
                output.write(envelope).await?;
            }
            output.write(&terminal).await?;
            summary.processed += 1;

            if terminal.is_failure() {
                summary.failed += 1;
                if let Some(sink) = errors.as_deref_mut() {
                    sink.write(&terminal).await?;
                }
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "stream finished"
        );
        Ok(summary)
    }

    /// Intermediate envelopes (when surfaced) and the terminal envelope for one line.
    async fn process(&self, line: &[u8]) -> (Vec<Envelope>, Envelope) {
        let record = match decode_record_bytes(line) {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "undecodable stream line");
                return (Vec::new(), Envelope::undecodable(&err));
            }
        };
        let OperationRecord {
            operation,
            arguments,
        } = record;

        let descriptor = match self.registry.lookup(&operation) {
            Ok(descriptor) => descriptor,
            Err(err) => return (Vec::new(), reject(operation, arguments, &err)),
        };
        let shape = match compose(descriptor, &arguments) {
            Ok(shape) => shape,
            Err(err) => return (Vec::new(), reject(operation, arguments, &err)),
        };
        if !shape.confirmation.is_cleared() {
            let err = ContractError::ConfirmationRequired {
                operation: operation.clone(),
            };
            return (Vec::new(), reject(operation, arguments, &err));
        }

        let mut attempts = Vec::new();
        let terminal = if self.options.surface_attempts {
            self.executor
                .execute_observed(descriptor, &shape, &arguments, &mut |envelope: &Envelope| {
                    attempts.push(envelope.clone());
                })
                .await
        } else {
            self.executor.execute(descriptor, &shape, &arguments).await
        };
        (attempts, terminal)
    }
}

fn reject(
    operation: String,
    arguments: Arguments,
    err: &ContractError,
) -> Envelope {
    Envelope::rejected(Some(operation), arguments, err.kind(), err)
}
