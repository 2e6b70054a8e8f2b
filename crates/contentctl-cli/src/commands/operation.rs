//! One subcommand per registered operation.
//!
//! # Design
//! - The argument list is derived from the descriptor's placeholders and
//!   flags, so a new table row needs no code here.
//! - Contract violations print an exception envelope and exit 2; requests
//!   that reach the server print the server's envelope.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use contentctl_core::{
    Arguments, Confirmation, ContractError, Descriptor, Envelope, Flag, compose, prepare,
};
use contentctl_engine::Mode;
use tracing::debug;

use crate::client::{AppContext, CliError, CliResult};
use crate::output::{LineSink, open_output};

const PREPARE_STREAM: &str = "prepare_stream";
const OUTPUT_FILE: &str = "output_file";
const ECHO_LOG: &str = "echo_log";
const FORCE: &str = "force";
const NO_FORCE: &str = "no_force";
const DEFAULT_ORGANIZATION: &str = "default_organization";
const QUERY_TERM: &str = "query_term";

/// Free-text options, in the order they are offered.
const TEXT_OPTIONS: &[&str] = &[
    "document_file",
    "document_body",
    "content_type",
    "select",
    "order",
    "mimetype_group",
    "organization",
    "environment_id",
];
/// Options parsed as non-negative integers.
const NUMBER_OPTIONS: &[&str] = &["document_version", "skip", "limit"];

/// Build the subcommand for `descriptor`.
pub(crate) fn operation_command(descriptor: &Descriptor) -> Command {
    let mut command = Command::new(descriptor.name.clone()).about(format!(
        "{} {}",
        descriptor.method.as_str().to_ascii_uppercase(),
        descriptor.url_template
    ));

    for name in &descriptor.required_arguments {
        command = add_once(command, text_option(name).required(true));
    }
    if descriptor.has(Flag::Collection) {
        command = add_once(command, number_option("skip"));
        command = add_once(command, number_option("limit"));
    }
    if descriptor.has(Flag::SendsDocument) || descriptor.has(Flag::SendsBinary) {
        command = add_once(
            command,
            text_option("document_file").conflicts_with("document_body"),
        );
        command = add_once(command, text_option("document_body"));
    }
    if descriptor.has(Flag::AllowsVersion) || descriptor.has(Flag::RequiresVersion) {
        command = add_once(command, number_option("document_version"));
    }
    if descriptor.has(Flag::RequiresContentType) {
        command = add_once(command, text_option("content_type"));
    }
    if descriptor.has(Flag::EntryCollection) {
        for name in ["select", "order", "content_type"] {
            command = add_once(command, text_option(name));
        }
        command = command.arg(
            Arg::new(QUERY_TERM)
                .value_name("QUERY_TERM")
                .num_args(0..)
                .help("Free-form filters such as fields.slug=home"),
        );
    }
    if descriptor.has(Flag::AssetCollection) {
        for name in ["select", "order", "mimetype_group"] {
            command = add_once(command, text_option(name));
        }
    }
    if descriptor.has(Flag::Organization) {
        command = command
            .arg(text_option("organization"))
            .arg(
                Arg::new(DEFAULT_ORGANIZATION)
                    .long("default-organization")
                    .action(ArgAction::SetTrue)
                    .help("Use the token's default organization"),
            )
            .group(
                ArgGroup::new("organization_choice")
                    .args(["organization", DEFAULT_ORGANIZATION])
                    .required(true),
            );
    }
    if descriptor.has(Flag::Dangerous) {
        command = command
            .arg(
                Arg::new(FORCE)
                    .long("force")
                    .action(ArgAction::SetTrue)
                    .conflicts_with(NO_FORCE)
                    .help("Skip the confirmation prompt"),
            )
            .arg(
                Arg::new(NO_FORCE)
                    .long("no-force")
                    .action(ArgAction::SetTrue)
                    .help("Ask for confirmation on the terminal"),
            );
    }
    if descriptor.has(Flag::EnvironmentScoped) {
        command = add_once(command, text_option("environment_id"));
    }

    command
        .arg(
            Arg::new(PREPARE_STREAM)
                .long("prepare-stream")
                .action(ArgAction::SetTrue)
                .help("Print the stream record for this invocation instead of executing it"),
        )
        .arg(
            Arg::new(OUTPUT_FILE)
                .long("output-file")
                .value_parser(value_parser!(PathBuf))
                .help("Write the result line to this file instead of stdout"),
        )
        .arg(
            Arg::new(ECHO_LOG)
                .long("echo-log")
                .action(ArgAction::SetTrue)
                .requires(OUTPUT_FILE)
                .help("Also print the result line to stdout"),
        )
}

fn text_option(name: &str) -> Arg {
    Arg::new(name.to_string())
        .long(name.replace('_', "-"))
        .value_name(name.to_ascii_uppercase())
}

fn number_option(name: &str) -> Arg {
    text_option(name).value_parser(value_parser!(u64))
}

fn add_once(command: Command, arg: Arg) -> Command {
    if command
        .get_arguments()
        .any(|existing| existing.get_id() == arg.get_id())
    {
        command
    } else {
        command.arg(arg)
    }
}

/// Collect the operation arguments from parsed matches.
pub(crate) fn collect_arguments(descriptor: &Descriptor, matches: &ArgMatches) -> Arguments {
    let mut arguments = Arguments::new();
    let text_names = descriptor
        .required_arguments
        .iter()
        .map(String::as_str)
        .chain(TEXT_OPTIONS.iter().copied());
    for name in text_names {
        if let Some(value) = matches.try_get_one::<String>(name).ok().flatten() {
            arguments.insert(name, value.clone());
        }
    }
    for name in NUMBER_OPTIONS {
        if let Some(value) = matches.try_get_one::<u64>(name).ok().flatten() {
            arguments.insert(*name, *value);
        }
    }
    if let Some(terms) = matches.try_get_many::<String>(QUERY_TERM).ok().flatten() {
        let terms: Vec<String> = terms.cloned().collect();
        if !terms.is_empty() {
            arguments.insert(QUERY_TERM, terms);
        }
    }
    if flag_set(matches, FORCE) {
        arguments.insert(FORCE, true);
    } else if flag_set(matches, NO_FORCE) {
        arguments.insert(FORCE, false);
    }
    arguments
}

fn flag_set(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

pub(crate) async fn handle_operation(
    ctx: &AppContext,
    descriptor: &Descriptor,
    matches: &ArgMatches,
) -> CliResult<()> {
    let arguments = collect_arguments(descriptor, matches);
    let output_file = matches.get_one::<PathBuf>(OUTPUT_FILE);
    let mut sink = open_output(output_file.map(PathBuf::as_path), flag_set(matches, ECHO_LOG)).await?;

    if flag_set(matches, PREPARE_STREAM) {
        return match prepare(&ctx.registry, &descriptor.name, arguments.clone()) {
            Ok(record) => sink.write_value(&record).await.map_err(CliError::failure),
            Err(err) => reject(&mut sink, descriptor, arguments, &err).await,
        };
    }

    let shape = match compose(descriptor, &arguments) {
        Ok(shape) => shape,
        Err(err) => return reject(&mut sink, descriptor, arguments, &err).await,
    };
    if shape.confirmation == Confirmation::Pending && !confirm(&descriptor.name)? {
        return Err(CliError::validation(format!(
            "{}: aborted without confirmation",
            descriptor.name
        )));
    }

    let executor = ctx.executor(Mode::Live)?;
    let envelope = executor.execute(descriptor, &shape, &arguments).await;
    debug!(status = ?envelope.status_code, attempt = envelope.attempt, "operation finished");
    sink.write_value(&envelope)
        .await
        .map_err(CliError::failure)?;

    if envelope.is_failure() {
        let reason = envelope.status_code.map_or_else(
            || envelope.exception.clone().unwrap_or_default(),
            |status| format!("status {status}"),
        );
        return Err(CliError::failure(anyhow!(
            "{} failed: {reason}",
            descriptor.name
        )));
    }
    Ok(())
}

async fn reject(
    sink: &mut LineSink,
    descriptor: &Descriptor,
    arguments: Arguments,
    err: &ContractError,
) -> CliResult<()> {
    let envelope = Envelope::rejected(Some(descriptor.name.clone()), arguments, err.kind(), err);
    sink.write_value(&envelope)
        .await
        .map_err(CliError::failure)?;
    Err(CliError::validation(err.to_string()))
}

/// Ask on the terminal. Without a terminal the answer cannot be given, which
/// is reported as a validation error.
fn confirm(operation: &str) -> CliResult<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(CliError::validation(format!(
            "{operation} needs confirmation; rerun with --force or from a terminal"
        )));
    }
    let mut stderr = io::stderr();
    write!(stderr, "{operation}: Are you sure? [y/N] ")
        .and_then(|()| stderr.flush())
        .map_err(CliError::failure)?;
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(CliError::failure)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
