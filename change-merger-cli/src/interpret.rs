//! Interpret command implementation for the change-merger CLI.
//!
//! Also hosts the interpretation options shared with the `fetch` command.

use std::io::Write;

use camino::Utf8PathBuf;
use change_merger_core::{Action, ChangeManager, DEFAULT_EXTERNAL_ID_TAG, InterpretResult};
use change_merger_data::XmlChangesetCodec;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::read_text;
use crate::output::write_json;
use crate::{
    ARG_ACTIONS, ARG_EXTERNAL_ID_TAG, ARG_INTERPRET_CHANGE, ARG_LOOKUP_TAGS, CliError,
    ENV_INTERPRET_CHANGE,
};

/// CLI arguments for the `interpret` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Interpret an osmChange document and report, per action, the \
                 elements carrying the external identifier tag. Created and \
                 deleted elements are reported unless --actions says \
                 otherwise.",
    about = "Interpret an osmChange document"
)]
#[ortho_config(prefix = "CHANGE_MERGER")]
pub(crate) struct InterpretArgs {
    /// Path to the osmChange XML document.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) change_path: Option<Utf8PathBuf>,
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

impl InterpretArgs {
    pub(crate) fn into_config(self) -> Result<InterpretConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InterpretConfig::try_from(merged)
    }
}

/// Interpretation settings shared by `interpret` and `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterpretOptions {
    /// Actions to report; `None` selects the defaults.
    pub(crate) actions: Option<Vec<Action>>,
    /// Tag keys to echo; `None` echoes nothing.
    pub(crate) lookup_tags: Option<Vec<String>>,
    pub(crate) external_id_tag: String,
}

impl InterpretOptions {
    pub(crate) fn parse(
        actions: Option<&str>,
        lookup_tags: Option<&str>,
        external_id_tag: Option<String>,
    ) -> Result<Self, CliError> {
        let actions = actions
            .map(|raw| {
                split_list(raw)
                    .map(str::parse::<Action>)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        let lookup_tags =
            lookup_tags.map(|raw| split_list(raw).map(str::to_owned).collect::<Vec<_>>());
        Ok(Self {
            actions,
            lookup_tags,
            external_id_tag: external_id_tag
                .unwrap_or_else(|| DEFAULT_EXTERNAL_ID_TAG.to_owned()),
        })
    }

    pub(crate) fn manager(&self) -> ChangeManager<XmlChangesetCodec> {
        ChangeManager::new(self.external_id_tag.as_str(), XmlChangesetCodec)
    }

    pub(crate) fn actions(&self) -> Option<&[Action]> {
        self.actions.as_deref()
    }

    pub(crate) fn lookup_tags(&self) -> Option<&[String]> {
        self.lookup_tags.as_deref()
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Resolved `interpret` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InterpretConfig {
    pub(crate) change_path: Utf8PathBuf,
    pub(crate) options: InterpretOptions,
}

impl TryFrom<InterpretArgs> for InterpretConfig {
    type Error = CliError;

    fn try_from(args: InterpretArgs) -> Result<Self, Self::Error> {
        let change_path = args.change_path.ok_or(CliError::MissingArgument {
            field: ARG_INTERPRET_CHANGE,
            env: ENV_INTERPRET_CHANGE,
        })?;
        let options = InterpretOptions::parse(
            args.actions.as_deref(),
            args.lookup_tags.as_deref(),
            args.external_id_tag,
        )?;
        Ok(Self {
            change_path,
            options,
        })
    }
}

pub(crate) fn run_interpret_with(
    args: InterpretArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let result = execute_interpret(&config)?;
    write_json(writer, &result)
}

pub(crate) fn execute_interpret(config: &InterpretConfig) -> Result<InterpretResult, CliError> {
    let text = read_text(&config.change_path, ARG_INTERPRET_CHANGE)?;
    let options = &config.options;
    options
        .manager()
        .interpret_encoded(&text, options.actions(), options.lookup_tags())
        .map_err(CliError::from)
}
