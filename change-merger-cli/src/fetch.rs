//! Fetch command implementation for the change-merger CLI.

use std::io::Write;
use std::time::Duration;

use change_merger_core::{ChangesetSource, InterpretResult, RemoteKind};
use change_merger_data::{HttpChangesetSource, HttpChangesetSourceConfig, RemoteEndpoint};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::interpret::InterpretOptions;
use crate::output::write_json;
use crate::{
    ARG_ACTIONS, ARG_EXTERNAL_ID_TAG, ARG_FETCH_API_BASE_URL, ARG_FETCH_API_KEY,
    ARG_FETCH_CHANGESET_ID, ARG_FETCH_PASSWORD, ARG_FETCH_REMOTE, ARG_FETCH_REPLICATION_BASE_URL,
    ARG_FETCH_TIMEOUT_SECS, ARG_FETCH_USERNAME, ARG_LOOKUP_TAGS, CliError, ENV_FETCH_CHANGESET_ID,
    ENV_FETCH_PASSWORD, ENV_FETCH_REPLICATION_BASE_URL, ENV_FETCH_USERNAME,
};

/// Base URL of the public OpenStreetMap editing API.
pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.openstreetmap.org/api/0.6";

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download a published changeset and interpret it. The api \
                 remote serves changeset/{id}/download; the replication \
                 remote serves gzipped diffs under a path derived from the \
                 zero-padded changeset id.",
    about = "Fetch and interpret a published changeset"
)]
#[ortho_config(prefix = "CHANGE_MERGER")]
pub(crate) struct FetchArgs {
    /// Identifier of the published changeset.
    #[arg(value_name = "id")]
    #[serde(default)]
    pub(crate) changeset_id: Option<u64>,
    /// Remote to download from: api or replication.
    #[arg(long = ARG_FETCH_REMOTE, value_name = "remote")]
    #[serde(default)]
    pub(crate) remote: Option<String>,
    /// Base URL of the OSM editing API.
    #[arg(long = ARG_FETCH_API_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) api_base_url: Option<String>,
    /// Base URL of the replication mirror.
    #[arg(long = ARG_FETCH_REPLICATION_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) replication_base_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_FETCH_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Value sent in the `x-api-key` header.
    #[arg(long = ARG_FETCH_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Basic auth username.
    #[arg(long = ARG_FETCH_USERNAME, value_name = "name")]
    #[serde(default)]
    pub(crate) username: Option<String>,
    /// Basic auth password.
    #[arg(long = ARG_FETCH_PASSWORD, value_name = "password")]
    #[serde(default)]
    pub(crate) password: Option<String>,
    /// Comma-separated actions to report (create, modify, delete).
    #[arg(long = ARG_ACTIONS, value_name = "list")]
    #[serde(default)]
    pub(crate) actions: Option<String>,
    /// Comma-separated tag keys echoed for each reported element.
    #[arg(long = ARG_LOOKUP_TAGS, value_name = "list")]
    #[serde(default)]
    pub(crate) lookup_tags: Option<String>,
    /// Tag naming the external identifier of each record.
    #[arg(long = ARG_EXTERNAL_ID_TAG, value_name = "key")]
    #[serde(default)]
    pub(crate) external_id_tag: Option<String>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) changeset_id: u64,
    pub(crate) remote: RemoteKind,
    /// Connection settings of the selected remote.
    pub(crate) endpoint: RemoteEndpoint,
    pub(crate) options: InterpretOptions,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let changeset_id = args.changeset_id.ok_or(CliError::MissingArgument {
            field: ARG_FETCH_CHANGESET_ID,
            env: ENV_FETCH_CHANGESET_ID,
        })?;
        let remote = args
            .remote
            .as_deref()
            .map(str::parse::<RemoteKind>)
            .transpose()?
            .unwrap_or_default();
        let base_url = match remote {
            RemoteKind::Api => args
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned()),
            RemoteKind::Replication => args.replication_base_url.ok_or(CliError::MissingArgument {
                field: ARG_FETCH_REPLICATION_BASE_URL,
                env: ENV_FETCH_REPLICATION_BASE_URL,
            })?,
        };

        let mut endpoint = RemoteEndpoint::new(base_url);
        if let Some(secs) = args.timeout_secs {
            endpoint = endpoint.with_timeout(Duration::from_secs(secs));
        }
        if let Some(api_key) = args.api_key {
            endpoint = endpoint.with_api_key(api_key);
        }
        match (args.username, args.password) {
            (Some(username), Some(password)) => {
                endpoint = endpoint.with_basic_auth(username, password);
            }
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_FETCH_PASSWORD,
                    env: ENV_FETCH_PASSWORD,
                });
            }
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_FETCH_USERNAME,
                    env: ENV_FETCH_USERNAME,
                });
            }
            (None, None) => {}
        }

        let options = InterpretOptions::parse(
            args.actions.as_deref(),
            args.lookup_tags.as_deref(),
            args.external_id_tag,
        )?;
        Ok(Self {
            changeset_id,
            remote,
            endpoint,
            options,
        })
    }
}

/// Builds a changeset source for the current fetch invocation.
pub(crate) trait SourceBuilder {
    fn build(&self, config: &FetchConfig) -> Result<Box<dyn ChangesetSource>, CliError>;
}

pub(crate) struct DefaultSourceBuilder;

impl SourceBuilder for DefaultSourceBuilder {
    fn build(&self, config: &FetchConfig) -> Result<Box<dyn ChangesetSource>, CliError> {
        // Only the selected remote is queried, so it fills both slots.
        let source_config =
            HttpChangesetSourceConfig::new(config.endpoint.clone(), config.endpoint.clone());
        let source = HttpChangesetSource::with_config(source_config).map_err(|source| {
            CliError::BuildSource {
                base_url: config.endpoint.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(source))
    }
}

pub(crate) fn run_fetch_with(
    args: FetchArgs,
    builder: &dyn SourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let result = execute_fetch(&config, builder)?;
    write_json(writer, &result)
}

pub(crate) fn execute_fetch(
    config: &FetchConfig,
    builder: &dyn SourceBuilder,
) -> Result<InterpretResult, CliError> {
    let source = builder.build(config)?;
    let options = &config.options;
    options
        .manager()
        .interpret_remote(
            source.as_ref(),
            config.remote,
            config.changeset_id,
            options.actions(),
            options.lookup_tags(),
        )
        .map_err(CliError::from)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FetchConfig, CliError> {
    let merged = FetchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FetchConfig::try_from(merged)
}
