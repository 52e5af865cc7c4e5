//! Caller-supplied OSM primitives.
//!
//! Identifiers follow the OSM editing convention: positive values name
//! existing elements and negative values are temporary placeholders scoped to
//! a single [`LogicalChange`](crate::LogicalChange).

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// OpenStreetMap-style tags.
///
/// Ordered by key so projected tag lists come out in ascending key order.
pub type Tags = BTreeMap<String, String>;

/// A point primitive.
///
/// # Examples
/// ```
/// use change_merger_core::{OsmNode, Tags};
///
/// let node = OsmNode::new(-1, 52.5, 13.4, Tags::new()).with_version(2);
/// assert!(node.is_temporary());
/// assert_eq!(node.version, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OsmNode {
    /// Element identifier; negative for temporary ids.
    pub id: i64,
    /// WGS84 latitude.
    pub lat: f64,
    /// WGS84 longitude.
    pub lon: f64,
    /// Element version as known to the caller.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: u32,
    /// Free-form key/value tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
}

impl OsmNode {
    /// Construct a node at version 0.
    pub fn new(id: i64, lat: f64, lon: f64, tags: Tags) -> Self {
        Self {
            id,
            lat,
            lon,
            version: 0,
            tags,
        }
    }

    /// Set the element version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Returns true when the identifier is a temporary placeholder.
    pub fn is_temporary(&self) -> bool {
        self.id < 0
    }
}

/// Reference from a way to one of its nodes.
///
/// Callers often send complete node objects here; everything except the
/// identifier is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRef {
    /// Identifier of the referenced node.
    pub id: i64,
}

/// A path primitive: an ordered list of node references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OsmWay {
    /// Element identifier; negative for temporary ids.
    pub id: i64,
    /// Element version as known to the caller.
    #[cfg_attr(feature = "serde", serde(default))]
    pub version: u32,
    /// Free-form key/value tags.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Tags,
    /// Ordered node references.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nodes: Vec<NodeRef>,
}

impl OsmWay {
    /// Construct a way at version 0 from node identifiers.
    pub fn new<I>(id: i64, node_ids: I, tags: Tags) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            id,
            version: 0,
            tags,
            nodes: node_ids.into_iter().map(|id| NodeRef { id }).collect(),
        }
    }

    /// Set the element version.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Iterate the referenced node identifiers in order.
    pub fn node_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.nodes.iter().map(|node| node.id)
    }
}

/// A primitive submitted for one action of a logical change.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "lowercase")
)]
pub enum Primitive {
    /// A point.
    Node(OsmNode),
    /// A path.
    Way(OsmWay),
}

impl Primitive {
    /// Identifier of the wrapped element.
    pub fn id(&self) -> i64 {
        match self {
            Self::Node(node) => node.id,
            Self::Way(way) => way.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn way_lists_node_ids_in_order() {
        let way = OsmWay::new(5, [3, -1, 7], Tags::new());
        assert_eq!(way.node_ids().collect::<Vec<_>>(), vec![3, -1, 7]);
    }

    #[rstest]
    #[case(-4, true)]
    #[case(0, false)]
    #[case(12, false)]
    fn node_reports_temporary_ids(#[case] id: i64, #[case] temporary: bool) {
        let node = OsmNode::new(id, 0.0, 0.0, Tags::new());
        assert_eq!(node.is_temporary(), temporary);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn way_ignores_extra_node_fields() {
        let json = r#"{
            "type": "way",
            "id": -1,
            "version": 0,
            "nodes": [
                { "id": -2, "type": "node", "version": 0, "lon": 24, "lat": 24, "tags": { "cat": "bark" } },
                { "id": 3, "type": "node", "version": 0, "lon": 25, "lat": 25 }
            ]
        }"#;

        let primitive: Primitive = serde_json::from_str(json).expect("way should deserialise");

        match primitive {
            Primitive::Way(way) => {
                assert_eq!(way.node_ids().collect::<Vec<_>>(), vec![-2, 3]);
                assert!(way.tags.is_empty());
            }
            other => panic!("expected a way, got {other:?}"),
        }
    }
}
