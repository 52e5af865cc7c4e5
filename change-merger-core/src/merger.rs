//! Fold an ordered batch of logical changes into one changeset.
//!
//! Each [`LogicalChange`] is remapped in isolation: every temporary id it
//! uses is replaced before any of its elements is projected, so a way may
//! reference nodes listed after it or under another action of the same
//! change. References to temporary ids of *other* changes are not supported
//! and fail the call.

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projector::{project_node, project_way};
use crate::{
    Action, ConsolidatedChangeset, IdGenerator, LogicalChange, Primitive, TempIdMap,
};

/// Value of the `generator` attribute on merged documents.
pub const GENERATOR: &str = "change-merger";

/// Generated identifier reported for a created external record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct IdMapping {
    /// Identifier of the record in the external system.
    pub external_id: String,
    /// Generated id of the reported element, or 0 when none was named.
    pub temp_osm_id: i64,
}

/// Everything a merge call produces.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutput {
    /// The consolidated document.
    pub changeset: ConsolidatedChangeset,
    /// One mapping per create change, in input order.
    pub created: Vec<IdMapping>,
    /// External ids of delete changes, in input order.
    pub deleted: Vec<String>,
}

/// Errors returned by [`merge_changes`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A way points at a temporary node id that its change never introduced.
    #[error(
        "way {way_id} in change {external_id:?} references temporary node {reference} \
         which the change does not define"
    )]
    UnresolvedReference {
        external_id: String,
        way_id: i64,
        reference: i64,
    },
    /// `temp_osm_id` names a temporary id that its change never introduced.
    #[error("change {external_id:?} reports temporary id {temp_osm_id} which it does not define")]
    UnresolvedTemporaryId {
        external_id: String,
        temp_osm_id: i64,
    },
}

/// Merge `changes` into a single changeset attributed to `changeset_id`.
///
/// Bucket contents follow input order. The call is atomic: on error nothing
/// is returned.
///
/// # Examples
/// ```
/// use change_merger_core::{
///     Action, ChangeBundle, LogicalChange, OsmNode, Primitive, Tags, merge_changes,
/// };
///
/// let node = |id| Primitive::Node(OsmNode::new(id, 0.0, 0.0, Tags::new()));
/// let changes = [
///     LogicalChange::new("a", Action::Create, ChangeBundle::with_create(vec![node(-1)]))
///         .with_temp_osm_id(-1),
///     LogicalChange::new("b", Action::Create, ChangeBundle::with_create(vec![node(-1)]))
///         .with_temp_osm_id(-1),
/// ];
///
/// let output = merge_changes(&changes, 1)?;
/// let ids: Vec<i64> = output.created.iter().map(|m| m.temp_osm_id).collect();
/// assert_eq!(ids, vec![-1, -2]);
/// # Ok::<(), change_merger_core::MergeError>(())
/// ```
pub fn merge_changes(
    changes: &[LogicalChange],
    changeset_id: i64,
) -> Result<MergeOutput, MergeError> {
    let mut generator = IdGenerator::new();
    let mut changeset = ConsolidatedChangeset::new(GENERATOR);
    let mut created = Vec::new();
    let mut deleted = Vec::new();

    for change in changes {
        let reported_id = merge_one(change, &mut generator, &mut changeset, changeset_id)?;
        match change.action {
            Action::Create => created.push(IdMapping {
                external_id: change.external_id.clone(),
                temp_osm_id: reported_id,
            }),
            Action::Delete => deleted.push(change.external_id.clone()),
            Action::Modify => {}
        }
    }

    Ok(MergeOutput {
        changeset,
        created,
        deleted,
    })
}

/// Remap, validate, and project one change; returns the reportable id.
fn merge_one(
    change: &LogicalChange,
    generator: &mut IdGenerator,
    changeset: &mut ConsolidatedChangeset,
    changeset_id: i64,
) -> Result<i64, MergeError> {
    let temp_ids = allocate_ids(change, generator);
    check_references(change, &temp_ids)?;
    let reported_id = reported_id(change, &temp_ids)?;

    for action in Action::ALL {
        let bucket = changeset.bucket_mut(action);
        for primitive in change.change.primitives(action) {
            match primitive {
                Primitive::Node(node) => {
                    bucket.nodes.push(project_node(node, &temp_ids, changeset_id));
                }
                Primitive::Way(way) => {
                    bucket.ways.push(project_way(way, &temp_ids, changeset_id));
                }
            }
        }
    }

    debug!(
        "merged change {:?}: {} primitives, {} temporary ids",
        change.external_id,
        change.change.iter().count(),
        temp_ids.len()
    );
    Ok(reported_id)
}

/// Draw a generated id for every distinct temporary id of `change`.
///
/// A temporary id repeated within the change names the same element and
/// keeps its first replacement.
fn allocate_ids(change: &LogicalChange, generator: &mut IdGenerator) -> TempIdMap {
    let mut temp_ids = TempIdMap::default();
    for primitive in change.change.iter() {
        let id = primitive.id();
        if id < 0 && temp_ids.get(id).is_none() {
            temp_ids.insert(id, generator.next_id());
        }
    }
    temp_ids
}

fn check_references(change: &LogicalChange, temp_ids: &TempIdMap) -> Result<(), MergeError> {
    for primitive in change.change.iter() {
        let Primitive::Way(way) = primitive else {
            continue;
        };
        if let Some(reference) = temp_ids.first_unresolved(way.node_ids()) {
            return Err(MergeError::UnresolvedReference {
                external_id: change.external_id.clone(),
                way_id: way.id,
                reference,
            });
        }
    }
    Ok(())
}

fn reported_id(change: &LogicalChange, temp_ids: &TempIdMap) -> Result<i64, MergeError> {
    let Some(temp_osm_id) = change.temp_osm_id else {
        return Ok(0);
    };
    temp_ids
        .resolve(temp_osm_id)
        .ok_or_else(|| MergeError::UnresolvedTemporaryId {
            external_id: change.external_id.clone(),
            temp_osm_id,
        })
}
