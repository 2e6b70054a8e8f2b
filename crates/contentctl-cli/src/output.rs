//! JSON-Lines output targets for CLI commands.

use std::path::Path;

use anyhow::Context;
use contentctl_engine::JsonLinesSink;
use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::client::{CliError, CliResult};

/// Sink over stdout or a file.
pub(crate) type LineSink = JsonLinesSink<Box<dyn AsyncWrite + Unpin + Send>>;

/// Open the primary output: `path` when given (truncating it), otherwise
/// stdout. `echo` additionally copies every line to stdout when writing to a
/// file.
pub(crate) async fn open_output(path: Option<&Path>, echo: bool) -> CliResult<LineSink> {
    match path {
        None => Ok(JsonLinesSink::new(Box::new(tokio::io::stdout()))),
        Some(path) => {
            let file: Box<dyn AsyncWrite + Unpin + Send> = Box::new(create_file(path).await?);
            let sink = JsonLinesSink::new(file);
            Ok(if echo {
                sink.echo_to(tokio::io::stdout())
            } else {
                sink
            })
        }
    }
}

/// Open a file-only sink, used for the stream error log.
pub(crate) async fn open_file(path: &Path) -> CliResult<JsonLinesSink<File>> {
    Ok(JsonLinesSink::new(create_file(path).await?))
}

async fn create_file(path: &Path) -> CliResult<File> {
    File::create(path)
        .await
        .with_context(|| format!("failed to open output file '{}'", path.display()))
        .map_err(CliError::failure)
}
