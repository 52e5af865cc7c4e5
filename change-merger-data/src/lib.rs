//! Wire formats and remote access for the change merger.
//!
//! Responsibilities:
//! - Encode and decode osmChange XML ([`xml::XmlChangesetCodec`]).
//! - Download published changesets from the OSM API or a replication mirror
//!   ([`remote::HttpChangesetSource`]).
//!
//! Boundaries:
//! - Do not encode domain rules (live in `change-merger-core`).
//! - Keep the blocking interface synchronous; async HTTP runs on an owned
//!   runtime.
//!
//! Invariants:
//! - No global mutable state.

pub mod remote;
pub mod xml;

pub use remote::{
    HttpChangesetSource, HttpChangesetSourceConfig, RemoteEndpoint, SourceBuildError,
    replication_path,
};
pub use xml::XmlChangesetCodec;
