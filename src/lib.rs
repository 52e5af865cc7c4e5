//! Facade crate for the change merger.
//!
//! This crate re-exports the core domain types and, behind the `remote`
//! feature, the osmChange XML codec and the HTTP changeset source.

#![forbid(unsafe_code)]

pub use change_merger_core::{
    Action, ChangeBundle, ChangeDocument, ChangeError, ChangeManager, ChangesetCodec,
    ChangesetSource, CodecError, ConsolidatedChangeset, FetchError, IdMapping, InterpretResult,
    InterpretedEntry, Interpreter, LogicalChange, MergeError, MergeOutput, MergeResponse,
    OsmNode, OsmWay, Primitive, RemoteKind, Tags, merge_changes,
};

#[cfg(feature = "remote")]
pub use change_merger_data::{
    HttpChangesetSource, HttpChangesetSourceConfig, RemoteEndpoint, SourceBuildError,
    XmlChangesetCodec,
};
