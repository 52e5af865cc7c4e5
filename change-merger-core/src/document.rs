//! Read model of an osmChange document.
//!
//! Decoders normalise whatever the wire format produced (lone elements,
//! lone tags, interleaved kinds) into plain lists here, deciding each
//! element's kind once. Elements other than nodes and ways are kept as
//! [`ChangeEntry::Unsupported`] so callers can see them without handling
//! their shape.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Action, ChangesetNode, ChangesetWay, ConsolidatedChangeset, OsmTag};

/// Kind of an element the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ElementKind {
    /// An OSM node.
    Node,
    /// An OSM way.
    Way,
}

impl ElementKind {
    /// The osmChange element name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
        }
    }

    /// Match an osmChange element name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "node" => Some(Self::Node),
            "way" => Some(Self::Way),
            _ => None,
        }
    }
}

/// A node or way read from an osmChange document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeElement {
    pub kind: ElementKind,
    pub id: i64,
    pub version: Option<u32>,
    pub changeset: Option<i64>,
    pub tags: Vec<OsmTag>,
}

impl ChangeElement {
    /// An element without version or changeset attributes.
    pub fn new(kind: ElementKind, id: i64, tags: Vec<OsmTag>) -> Self {
        Self {
            kind,
            id,
            version: None,
            changeset: None,
            tags,
        }
    }
}

/// One child of an action section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEntry {
    /// A node or way.
    Element(ChangeElement),
    /// Any other element, such as a relation, named by its tag.
    Unsupported {
        /// Element name as it appeared in the document.
        name: String,
    },
}

/// A decoded osmChange document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeDocument {
    pub generator: Option<String>,
    pub version: Option<String>,
    pub create: Vec<ChangeEntry>,
    pub modify: Vec<ChangeEntry>,
    pub delete: Vec<ChangeEntry>,
}

impl ChangeDocument {
    /// Entries recorded for `action`.
    pub fn entries(&self, action: Action) -> &[ChangeEntry] {
        match action {
            Action::Create => &self.create,
            Action::Modify => &self.modify,
            Action::Delete => &self.delete,
        }
    }

    /// Mutable entries recorded for `action`.
    pub fn entries_mut(&mut self, action: Action) -> &mut Vec<ChangeEntry> {
        match action {
            Action::Create => &mut self.create,
            Action::Modify => &mut self.modify,
            Action::Delete => &mut self.delete,
        }
    }
}

impl From<&ChangesetNode> for ChangeElement {
    fn from(node: &ChangesetNode) -> Self {
        Self {
            kind: ElementKind::Node,
            id: node.id,
            version: Some(node.version),
            changeset: Some(node.changeset),
            tags: node.tags.clone(),
        }
    }
}

impl From<&ChangesetWay> for ChangeElement {
    fn from(way: &ChangesetWay) -> Self {
        Self {
            kind: ElementKind::Way,
            id: way.id,
            version: Some(way.version),
            changeset: Some(way.changeset),
            tags: way.tags.clone(),
        }
    }
}

impl From<&ConsolidatedChangeset> for ChangeDocument {
    /// Nodes precede ways within each action, matching the written document.
    fn from(changeset: &ConsolidatedChangeset) -> Self {
        let mut document = Self {
            generator: Some(changeset.generator.clone()),
            version: Some(changeset.version().to_owned()),
            ..Self::default()
        };
        for action in Action::ALL {
            let bucket = changeset.bucket(action);
            let entries = document.entries_mut(action);
            entries.extend(
                bucket
                    .nodes
                    .iter()
                    .map(|node| ChangeEntry::Element(node.into())),
            );
            entries.extend(bucket.ways.iter().map(|way| ChangeEntry::Element(way.into())));
        }
        document
    }
}
