//! Projection of caller primitives into changeset elements.
//!
//! Projection builds new values and never touches the caller's input. It is
//! total: temporary ids without a table entry are kept as-is, so callers that
//! must reject dangling references check them with
//! [`TempIdMap::first_unresolved`] first.

use crate::{ChangesetNode, ChangesetWay, OsmNode, OsmTag, OsmWay, Tags, TempIdMap};

/// Convert a tag map into a `k`/`v` list in ascending key order.
pub fn project_tags(tags: &Tags) -> Vec<OsmTag> {
    tags.iter()
        .map(|(key, value)| OsmTag::new(key.as_str(), value.as_str()))
        .collect()
}

/// Project a node, substituting its id through `temp_ids`.
pub fn project_node(node: &OsmNode, temp_ids: &TempIdMap, changeset_id: i64) -> ChangesetNode {
    ChangesetNode {
        id: temp_ids.resolve_or_keep(node.id),
        lat: node.lat,
        lon: node.lon,
        version: node.version,
        changeset: changeset_id,
        tags: project_tags(&node.tags),
    }
}

/// Project a way, substituting its id and node references through `temp_ids`.
pub fn project_way(way: &OsmWay, temp_ids: &TempIdMap, changeset_id: i64) -> ChangesetWay {
    ChangesetWay {
        id: temp_ids.resolve_or_keep(way.id),
        version: way.version,
        changeset: changeset_id,
        node_refs: way
            .node_ids()
            .map(|id| temp_ids.resolve_or_keep(id))
            .collect(),
        tags: project_tags(&way.tags),
    }
}
