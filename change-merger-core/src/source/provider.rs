//! Changeset source trait and remote selector.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ChangeDocument;

use super::error::{FetchError, ParseRemoteKindError};

/// Which remote serves the changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RemoteKind {
    /// The editing API, `changeset/{id}/download`.
    #[default]
    Api,
    /// The minutely replication mirror, `{AAA}/{BBB}/{CCC}.osc.gz`.
    Replication,
}

impl RemoteKind {
    /// Lowercase name used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Replication => "replication",
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteKind {
    type Err = ParseRemoteKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "replication" => Ok(Self::Replication),
            _ => Err(ParseRemoteKindError {
                value: value.to_owned(),
            }),
        }
    }
}

/// Fetch and decode a published changeset.
///
/// # Examples
///
/// ```rust
/// use change_merger_core::{ChangeDocument, ChangesetSource, FetchError, RemoteKind};
///
/// struct EmptySource;
///
/// impl ChangesetSource for EmptySource {
///     fn fetch_change(
///         &self,
///         remote: RemoteKind,
///         changeset_id: u64,
///     ) -> Result<ChangeDocument, FetchError> {
///         match remote {
///             RemoteKind::Api => Ok(ChangeDocument::default()),
///             RemoteKind::Replication => Err(FetchError::NotFound {
///                 changeset_id,
///                 url: "memory".into(),
///             }),
///         }
///     }
/// }
///
/// let document = EmptySource.fetch_change(RemoteKind::Api, 12)?;
/// assert!(document.create.is_empty());
/// # Ok::<(), FetchError>(())
/// ```
pub trait ChangesetSource {
    /// Retrieve changeset `changeset_id` from `remote`.
    fn fetch_change(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError>;
}
