//! Command-line entry point: global options, the dynamic operation
//! subcommands, and dispatch.
//!
//! # Design
//! - One subcommand per registered operation is generated at startup from the
//!   registry, next to the fixed `stream` and `operations` subcommands.
//! - Usage errors exit with 2, contract violations with 2, and failures that
//!   happen after a request was attempted with 3.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgMatches, Args, Command, CommandFactory, FromArgMatches, Parser};
use contentctl_config::{Credentials, SettingsOverrides, load_settings};
use contentctl_core::Registry;
use contentctl_engine::RetryPolicy;
use contentctl_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::operation::{handle_operation, operation_command};
use crate::commands::operations::handle_operations;
use crate::commands::stream::{StreamArgs, handle_stream};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const STREAM_COMMAND: &str = "stream";
const OPERATIONS_COMMAND: &str = "operations";

#[derive(Debug, Parser)]
#[command(
    name = "contentctl",
    version,
    about = "Command-line client for the Contentful Content Management API",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    /// OAuth token sent as a bearer credential.
    #[arg(long, global = true, env = "CONTENTFUL_OAUTH_TOKEN", hide_env_values = true)]
    oauth_token: Option<String>,
    /// Gateway API key sent in the `apikey` header.
    #[arg(
        long,
        global = true,
        env = "CONTENTFUL_GATEWAY_API_KEY",
        hide_env_values = true
    )]
    gateway_api_key: Option<String>,
    /// Base URL of the management API.
    #[arg(long, global = true, env = "CONTENTFUL_API_URL")]
    api_url: Option<String>,
    /// Base URL of the upload API.
    #[arg(long, global = true, env = "CONTENTFUL_UPLOAD_URL")]
    upload_url: Option<String>,
    /// Configuration file; defaults to `$XDG_CONFIG_HOME/contentctl/config.json`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "CONTENTCTL_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    /// Retries after a transient failure.
    #[arg(long, global = true, default_value_t = RetryPolicy::default().max_retries)]
    max_retries: u32,
    /// Send each request once.
    #[arg(long, global = true, conflicts_with = "max_retries")]
    no_retry: bool,
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    /// Log format written to stderr: `json` or `pretty`.
    #[arg(long, global = true, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|err| err.to_string())
}

/// Full command tree for `registry`.
fn build_command(registry: &Registry) -> Command {
    let mut command = Cli::command()
        .subcommand(
            StreamArgs::augment_args(Command::new(STREAM_COMMAND))
                .about("Replay a JSON-Lines file of operation records"),
        )
        .subcommand(
            Command::new(OPERATIONS_COMMAND)
                .about("List every registered operation as JSON lines"),
        );
    for descriptor in registry.descriptors() {
        command = command.subcommand(operation_command(descriptor));
    }
    command
}

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let registry = match Registry::standard() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: invalid operation table: {err}");
            return 3;
        }
    };

    let matches = match build_command(&registry).try_get_matches_from(env::args_os()) {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 2 } else { 0 };
        }
    };
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return 2;
        }
    };

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let span = info_span!("run", run_id = %Uuid::new_v4());
    match dispatch(cli, registry, &matches).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, registry: Registry, matches: &ArgMatches) -> CliResult<()> {
    let overrides = SettingsOverrides {
        api_url: cli.api_url,
        upload_url: cli.upload_url,
        credentials: Credentials {
            oauth_token: cli.oauth_token,
            gateway_api_key: cli.gateway_api_key,
        },
    };
    let settings = load_settings(cli.config.as_deref(), overrides).map_err(CliError::failure)?;
    let retry = if cli.no_retry {
        RetryPolicy::disabled()
    } else {
        RetryPolicy {
            max_retries: cli.max_retries,
            ..RetryPolicy::default()
        }
    };
    let ctx = AppContext {
        registry,
        settings,
        timeout: Duration::from_secs(cli.timeout),
        retry,
    };

    match matches.subcommand() {
        Some((STREAM_COMMAND, sub)) => {
            let args = StreamArgs::from_arg_matches(sub)
                .map_err(|err| CliError::validation(err.to_string()))?;
            handle_stream(&ctx, args).await
        }
        Some((OPERATIONS_COMMAND, _)) => handle_operations(&ctx.registry).await,
        Some((name, sub)) => {
            let descriptor = ctx
                .registry
                .lookup(name)
                .map_err(|err| CliError::validation(err.to_string()))?
                .clone();
            handle_operation(&ctx, &descriptor, sub).await
        }
        None => Err(CliError::validation("no command given")),
    }
}
