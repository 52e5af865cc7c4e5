//! Core domain logic for the change merger.
//!
//! The crate folds batches of [`LogicalChange`] values into a single
//! [`ConsolidatedChangeset`] and performs the inverse walk, extracting
//! external-identifier mappings from an osmChange document.
//!
//! Boundaries:
//! - No I/O. Text encoding sits behind [`ChangesetCodec`] and remote
//!   retrieval behind [`ChangesetSource`]; `change-merger-data` provides the
//!   concrete implementations.
//! - No global state. The external-identifier tag is a constructor argument
//!   of [`Interpreter`] and [`ChangeManager`].
//!
//! # Examples
//!
//! ```
//! use change_merger_core::{
//!     Action, ChangeBundle, ChangeDocument, Interpreter, LogicalChange, OsmNode, Primitive,
//!     Tags, merge_changes,
//! };
//!
//! let tags = Tags::from([("externalId".to_owned(), "a".to_owned())]);
//! let change = LogicalChange::new(
//!     "a",
//!     Action::Create,
//!     ChangeBundle::with_create(vec![Primitive::Node(OsmNode::new(-1, 1.0, 2.0, tags))]),
//! )
//! .with_temp_osm_id(-1);
//!
//! let output = merge_changes(&[change], 7)?;
//! assert_eq!(output.created[0].temp_osm_id, -1);
//!
//! let document = ChangeDocument::from(&output.changeset);
//! let result = Interpreter::new("externalId").interpret(&document, None, None);
//! assert_eq!(result.created.map(|entries| entries.len()), Some(1));
//! # Ok::<(), change_merger_core::MergeError>(())
//! ```

#![forbid(unsafe_code)]

pub mod change;
pub mod changeset;
pub mod codec;
pub mod document;
pub mod element;
pub mod ids;
pub mod interpreter;
pub mod manager;
pub mod merger;
pub mod projector;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use change::{Action, ChangeBundle, LogicalChange, ParseActionError};
pub use changeset::{
    ActionBucket, ChangesetNode, ChangesetWay, ConsolidatedChangeset, OSM_CHANGE_VERSION, OsmTag,
};
pub use codec::{ChangesetCodec, CodecError};
pub use document::{ChangeDocument, ChangeElement, ChangeEntry, ElementKind};
pub use element::{NodeRef, OsmNode, OsmWay, Primitive, Tags};
pub use ids::{IdGenerator, TempIdMap};
pub use interpreter::{
    DEFAULT_ACTIONS, DEFAULT_EXTERNAL_ID_TAG, InterpretResult, InterpretedEntry, Interpreter,
};
pub use manager::{ChangeError, ChangeManager, MergeResponse};
pub use merger::{GENERATOR, IdMapping, MergeError, MergeOutput, merge_changes};
pub use source::{ChangesetSource, FetchError, ParseRemoteKindError, RemoteKind};
