//! Retrieve published osmChange documents by changeset id.
//!
//! The `ChangesetSource` trait abstracts where a changeset comes from. The
//! [`RemoteKind`] selects between the editing API, which serves a changeset
//! directly, and the replication mirror, which serves gzipped diffs on a
//! segmented path.
//!
//! Errors carry the transport status where one exists so callers can
//! forward it.

mod error;
mod provider;

pub use error::{FetchError, ParseRemoteKindError};
pub use provider::{ChangesetSource, RemoteKind};
