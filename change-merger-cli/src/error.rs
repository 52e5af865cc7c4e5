//! Error types emitted by the change-merger CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use change_merger_core::{ChangeError, ParseActionError, ParseRemoteKindError};
use change_merger_data::SourceBuildError;
use thiserror::Error;

/// Errors emitted by the change-merger CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An input file could not be opened.
    #[error("failed to open {field} file {path:?}: {source}")]
    OpenInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input file could not be read as UTF-8 text.
    #[error("failed to read {field} file {path:?}: {source}")]
    ReadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The merge request JSON was malformed.
    #[error("failed to parse merge request {path:?}: {source}")]
    ParseMergeRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// An `--actions` entry named an unknown action.
    #[error("invalid --actions value: {0}")]
    InvalidAction(#[from] ParseActionError),
    /// The `--remote` value named an unknown remote.
    #[error("invalid --remote value: {0}")]
    InvalidRemote(#[from] ParseRemoteKindError),
    /// Merging, decoding, or fetching failed.
    #[error(transparent)]
    Change(#[from] ChangeError),
    /// Failed to construct the HTTP changeset source.
    #[error("failed to build changeset source for {base_url}: {source}")]
    BuildSource {
        base_url: String,
        #[source]
        source: SourceBuildError,
    },
    /// Failed to serialise the command output as JSON.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Failed to write the command output.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
