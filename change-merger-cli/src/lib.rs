//! Command-line interface for merging and interpreting osmChange documents.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::LevelFilter;

mod error;
mod fetch;
mod input;
mod interpret;
mod merge;
mod output;

pub use error::CliError;

use fetch::{DefaultSourceBuilder, FetchArgs, run_fetch_with};
use interpret::{InterpretArgs, run_interpret_with};
use merge::{MergeArgs, run_merge_with};

pub(crate) const ARG_MERGE_REQUEST: &str = "request";
pub(crate) const ENV_MERGE_REQUEST: &str = "CHANGE_MERGER_CMDS_MERGE_REQUEST_PATH";
pub(crate) const ARG_INTERPRET_CHANGE: &str = "change";
pub(crate) const ENV_INTERPRET_CHANGE: &str = "CHANGE_MERGER_CMDS_INTERPRET_CHANGE_PATH";
pub(crate) const ARG_FETCH_CHANGESET_ID: &str = "changeset-id";
pub(crate) const ENV_FETCH_CHANGESET_ID: &str = "CHANGE_MERGER_CMDS_FETCH_CHANGESET_ID";
pub(crate) const ARG_FETCH_REMOTE: &str = "remote";
pub(crate) const ARG_FETCH_API_BASE_URL: &str = "api-base-url";
pub(crate) const ARG_FETCH_REPLICATION_BASE_URL: &str = "replication-base-url";
pub(crate) const ENV_FETCH_REPLICATION_BASE_URL: &str =
    "CHANGE_MERGER_CMDS_FETCH_REPLICATION_BASE_URL";
pub(crate) const ARG_FETCH_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_FETCH_API_KEY: &str = "api-key";
pub(crate) const ARG_FETCH_USERNAME: &str = "username";
pub(crate) const ENV_FETCH_USERNAME: &str = "CHANGE_MERGER_CMDS_FETCH_USERNAME";
pub(crate) const ARG_FETCH_PASSWORD: &str = "password";
pub(crate) const ENV_FETCH_PASSWORD: &str = "CHANGE_MERGER_CMDS_FETCH_PASSWORD";
pub(crate) const ARG_ACTIONS: &str = "actions";
pub(crate) const ARG_LOOKUP_TAGS: &str = "lookup-tags";
pub(crate) const ARG_EXTERNAL_ID_TAG: &str = "external-id-tag";

/// Run the change-merger CLI with the current process arguments and
/// environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    install_logger(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Merge(args) => run_merge_with(args, &mut stdout),
        Command::Interpret(args) => run_interpret_with(args, &mut stdout),
        Command::Fetch(args) => run_fetch_with(args, &DefaultSourceBuilder, &mut stdout),
    }
}

fn install_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let installed = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("change_merger_core", level)
        .filter_module("change_merger_data", level)
        .filter_module("change_merger_cli", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init();
    // A logger may already be installed when embedded.
    installed.ok();
}

#[derive(Debug, Parser)]
#[command(
    name = "change-merger",
    about = "Merge logical changes into osmChange documents and interpret published changesets",
    version
)]
struct Cli {
    /// Log debug output from the merger and the remote sources.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge a batch of logical changes into one osmChange document.
    Merge(MergeArgs),
    /// Interpret an osmChange document stored on disk.
    Interpret(InterpretArgs),
    /// Download a published changeset and interpret it.
    Fetch(FetchArgs),
}

#[cfg(test)]
mod tests;
