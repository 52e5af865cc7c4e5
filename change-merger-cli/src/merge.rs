//! Merge command implementation for the change-merger CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use change_merger_core::{ChangeManager, DEFAULT_EXTERNAL_ID_TAG, LogicalChange, MergeResponse};
use change_merger_data::XmlChangesetCodec;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::open_input;
use crate::output::write_json;
use crate::{ARG_EXTERNAL_ID_TAG, ARG_MERGE_REQUEST, CliError, ENV_MERGE_REQUEST};

/// CLI arguments for the `merge` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Merge a batch of logical changes into a single osmChange \
                 document. The request is a JSON object holding the target \
                 changesetId and the list of changes; the response carries \
                 the encoded document together with the generated ids of \
                 created records and the external ids of deleted ones.",
    about = "Merge logical changes into one osmChange document"
)]
#[ortho_config(prefix = "CHANGE_MERGER")]
pub(crate) struct MergeArgs {
    /// Path to a JSON file containing the merge request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Tag naming the external identifier of each record.
    #[arg(long = ARG_EXTERNAL_ID_TAG, value_name = "key")]
    #[serde(default)]
    pub(crate) external_id_tag: Option<String>,
}

impl MergeArgs {
    pub(crate) fn into_config(self) -> Result<MergeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MergeConfig::try_from(merged)
    }
}

/// Resolved `merge` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) external_id_tag: String,
}

impl TryFrom<MergeArgs> for MergeConfig {
    type Error = CliError;

    fn try_from(args: MergeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_MERGE_REQUEST,
            env: ENV_MERGE_REQUEST,
        })?;
        let external_id_tag = args
            .external_id_tag
            .unwrap_or_else(|| DEFAULT_EXTERNAL_ID_TAG.to_owned());
        Ok(Self {
            request_path,
            external_id_tag,
        })
    }
}

/// Body of a merge request file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MergeRequest {
    /// Changeset the consolidated document is stamped with.
    pub(crate) changeset_id: i64,
    /// Logical changes in submission order.
    pub(crate) changes: Vec<LogicalChange>,
}

pub(crate) fn run_merge_with(args: MergeArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let response = execute_merge(&config)?;
    write_json(writer, &response)
}

pub(crate) fn execute_merge(config: &MergeConfig) -> Result<MergeResponse, CliError> {
    let request = load_merge_request(&config.request_path)?;
    let manager = ChangeManager::new(config.external_id_tag.as_str(), XmlChangesetCodec);
    let response = manager.merge_changes(&request.changes, request.changeset_id)?;
    Ok(response)
}

/// Loads a JSON-encoded [`MergeRequest`] from disk.
pub(crate) fn load_merge_request(path: &Utf8Path) -> Result<MergeRequest, CliError> {
    let reader = open_input(path, ARG_MERGE_REQUEST)?;
    serde_json::from_reader(reader).map_err(|source| CliError::ParseMergeRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<MergeConfig, CliError> {
    let merged = MergeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    MergeConfig::try_from(merged)
}
