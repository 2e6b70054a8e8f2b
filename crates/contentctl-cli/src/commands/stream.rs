//! `stream` subcommand: replay a JSON-Lines file of operation records.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Args;
use contentctl_engine::{EnvelopeSink, Mode, StreamDriver, StreamOptions};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_stream::wrappers::SplitStream;
use tracing::{info, warn};

use crate::client::{AppContext, CliError, CliResult};
use crate::output::{open_file, open_output};

#[derive(Debug, Args)]
pub(crate) struct StreamArgs {
    /// Records to replay, one JSON object per line; `-` reads stdin.
    #[arg(value_name = "STREAM_FILE")]
    pub(crate) stream_file: PathBuf,
    /// Write envelopes to this file instead of stdout.
    #[arg(long)]
    pub(crate) output_file: Option<PathBuf>,
    /// Additionally write failed envelopes to this file.
    #[arg(long)]
    pub(crate) error_file: Option<PathBuf>,
    /// Also print envelopes to stdout when `--output-file` is set.
    #[arg(long, requires = "output_file")]
    pub(crate) echo_log: bool,
    /// Describe each request instead of sending it.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Write an envelope for every attempt, not only the final one.
    #[arg(long)]
    pub(crate) log_attempts: bool,
}

pub(crate) async fn handle_stream(ctx: &AppContext, args: StreamArgs) -> CliResult<()> {
    let mode = if args.dry_run { Mode::DryRun } else { Mode::Live };
    let executor = ctx.executor(mode)?;
    let reader = BufReader::new(open_input(&args.stream_file).await?);
    let input = SplitStream::new(reader.split(b'\n'));

    let mut output = open_output(args.output_file.as_deref(), args.echo_log).await?;
    let mut errors = match &args.error_file {
        Some(path) => Some(open_file(path).await?),
        None => None,
    };

    let driver = StreamDriver::new(
        &ctx.registry,
        executor,
        StreamOptions {
            surface_attempts: args.log_attempts,
        },
    );
    let summary = driver
        .run_until(
            input,
            &mut output,
            errors.as_mut().map(|sink| sink as &mut dyn EnvelopeSink),
            shutdown_signal(),
        )
        .await
        .map_err(CliError::failure)?;

    info!(
        processed = summary.processed,
        failed = summary.failed,
        "stream finished"
    );
    if summary.interrupted {
        return Err(CliError::failure(anyhow!(
            "interrupted after {} records",
            summary.processed
        )));
    }
    Ok(())
}

async fn open_input(path: &Path) -> CliResult<Box<dyn AsyncRead + Unpin + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open stream file '{}'", path.display()))
        .map_err(CliError::failure)?;
    Ok(Box::new(file))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
