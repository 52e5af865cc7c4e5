//! The consolidated osmChange produced by a merge call.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Action;

/// osmChange format version written by the merger.
pub const OSM_CHANGE_VERSION: &str = "0.6";

/// A single `k`/`v` tag as it appears in an osmChange document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OsmTag {
    /// Tag key.
    pub k: String,
    /// Tag value.
    pub v: String,
}

impl OsmTag {
    /// Construct a tag.
    pub fn new(k: impl Into<String>, v: impl Into<String>) -> Self {
        Self {
            k: k.into(),
            v: v.into(),
        }
    }
}

/// A node ready to be written to an osmChange document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangesetNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub version: u32,
    pub changeset: i64,
    pub tags: Vec<OsmTag>,
}

/// A way ready to be written to an osmChange document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangesetWay {
    pub id: i64,
    pub version: u32,
    pub changeset: i64,
    /// Resolved node identifiers, written as `<nd ref="..."/>`.
    pub node_refs: Vec<i64>,
    pub tags: Vec<OsmTag>,
}

/// Nodes and ways collected for one action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionBucket {
    pub nodes: Vec<ChangesetNode>,
    pub ways: Vec<ChangesetWay>,
}

impl ActionBucket {
    /// Returns true when the bucket holds no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty()
    }

    /// Number of elements in the bucket.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.ways.len()
    }
}

/// The single aggregated output document of a merge call.
///
/// # Examples
/// ```
/// use change_merger_core::{Action, ConsolidatedChangeset, OSM_CHANGE_VERSION};
///
/// let changeset = ConsolidatedChangeset::new("change-merger");
/// assert_eq!(changeset.version(), OSM_CHANGE_VERSION);
/// assert!(changeset.bucket(Action::Create).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedChangeset {
    /// Value of the `generator` attribute.
    pub generator: String,
    pub create: ActionBucket,
    pub modify: ActionBucket,
    pub delete: ActionBucket,
}

impl ConsolidatedChangeset {
    /// An empty changeset attributed to `generator`.
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            create: ActionBucket::default(),
            modify: ActionBucket::default(),
            delete: ActionBucket::default(),
        }
    }

    /// The osmChange format version.
    pub const fn version(&self) -> &'static str {
        OSM_CHANGE_VERSION
    }

    /// The bucket for `action`.
    pub fn bucket(&self, action: Action) -> &ActionBucket {
        match action {
            Action::Create => &self.create,
            Action::Modify => &self.modify,
            Action::Delete => &self.delete,
        }
    }

    /// Mutable access to the bucket for `action`.
    pub fn bucket_mut(&mut self, action: Action) -> &mut ActionBucket {
        match action {
            Action::Create => &mut self.create,
            Action::Modify => &mut self.modify,
            Action::Delete => &mut self.delete,
        }
    }
}
