//! Entry point tying merging, interpretation, and encoding together.

use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Action, ChangeDocument, ChangesetCodec, ChangesetSource, CodecError, FetchError, IdMapping,
    InterpretResult, Interpreter, LogicalChange, MergeError, RemoteKind, merge_changes,
};

/// Errors surfaced by [`ChangeManager`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Encoded result of a merge call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergeResponse {
    /// The consolidated osmChange document as text.
    pub change: String,
    /// Generated ids of created records, in input order.
    pub created: Vec<IdMapping>,
    /// External ids of deleted records, in input order.
    pub deleted: Vec<String>,
}

/// Merges and interprets changes using one codec and one external-id tag.
///
/// # Examples
/// ```
/// use change_merger_core::{
///     ChangeDocument, ChangeManager, ChangesetCodec, CodecError, ConsolidatedChangeset,
/// };
///
/// struct CountingCodec;
///
/// impl ChangesetCodec for CountingCodec {
///     fn encode(&self, changeset: &ConsolidatedChangeset) -> Result<String, CodecError> {
///         Ok(format!("{} created", changeset.create.len()))
///     }
///
///     fn decode(&self, _text: &str) -> Result<ChangeDocument, CodecError> {
///         Ok(ChangeDocument::default())
///     }
/// }
///
/// let manager = ChangeManager::new("externalId", CountingCodec);
/// let response = manager.merge_changes(&[], 1)?;
/// assert_eq!(response.change, "0 created");
/// # Ok::<(), change_merger_core::ChangeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ChangeManager<C> {
    interpreter: Interpreter,
    codec: C,
}

impl<C: ChangesetCodec> ChangeManager<C> {
    /// A manager matching `external_id_tag` and writing through `codec`.
    pub fn new(external_id_tag: impl Into<String>, codec: C) -> Self {
        Self {
            interpreter: Interpreter::new(external_id_tag),
            codec,
        }
    }

    /// The configured external-identifier tag key.
    pub fn external_id_tag(&self) -> &str {
        self.interpreter.external_id_tag()
    }

    /// The codec used to read and write documents.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Merge `changes` and encode the consolidated document.
    pub fn merge_changes(
        &self,
        changes: &[LogicalChange],
        changeset_id: i64,
    ) -> Result<MergeResponse, ChangeError> {
        info!(
            "started merging {} changes into changeset {changeset_id}",
            changes.len()
        );
        let output = merge_changes(changes, changeset_id)?;
        let change = self.codec.encode(&output.changeset)?;
        Ok(MergeResponse {
            change,
            created: output.created,
            deleted: output.deleted,
        })
    }

    /// Interpret an already decoded document.
    pub fn interpret_change(
        &self,
        document: &ChangeDocument,
        actions: Option<&[Action]>,
        lookup_tags: Option<&[String]>,
    ) -> InterpretResult {
        info!(
            "started change interpretation (actions: {actions:?}, external id tag: {}, lookup tags: {lookup_tags:?})",
            self.external_id_tag()
        );
        self.interpreter.interpret(document, actions, lookup_tags)
    }

    /// Decode `text` with the codec, then interpret it.
    pub fn interpret_encoded(
        &self,
        text: &str,
        actions: Option<&[Action]>,
        lookup_tags: Option<&[String]>,
    ) -> Result<InterpretResult, ChangeError> {
        let document = self.codec.decode(text)?;
        Ok(self.interpret_change(&document, actions, lookup_tags))
    }

    /// Fetch changeset `changeset_id` from `source`, then interpret it.
    pub fn interpret_remote(
        &self,
        source: &dyn ChangesetSource,
        remote: RemoteKind,
        changeset_id: u64,
        actions: Option<&[Action]>,
        lookup_tags: Option<&[String]>,
    ) -> Result<InterpretResult, ChangeError> {
        info!("fetching changeset {changeset_id} from {remote}");
        let document = source.fetch_change(remote, changeset_id)?;
        Ok(self.interpret_change(&document, actions, lookup_tags))
    }
}
