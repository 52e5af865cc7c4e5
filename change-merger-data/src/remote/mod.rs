//! Remote changeset retrieval.
//!
//! [`HttpChangesetSource`] implements
//! [`change_merger_core::ChangesetSource`] against the OSM editing API and a
//! replication mirror. API downloads are plain osmChange XML fetched from
//! `changeset/{id}/download`; replication diffs are gzipped and live on a
//! segmented path built by [`replication_path`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use change_merger_core::{ChangesetSource, RemoteKind};
//! use change_merger_data::remote::{
//!     HttpChangesetSource, HttpChangesetSourceConfig, RemoteEndpoint,
//! };
//!
//! let config = HttpChangesetSourceConfig::new(
//!     RemoteEndpoint::new("https://api.openstreetmap.org/api/0.6")
//!         .with_timeout(Duration::from_secs(10)),
//!     RemoteEndpoint::new("https://osm-replication.example.com/changes")
//!         .with_api_key("secret"),
//! );
//! let source = HttpChangesetSource::with_config(config)?;
//! let document = source.fetch_change(RemoteKind::Replication, 123_456)?;
//! println!("{} created entries", document.create.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod replication;
mod source;

#[doc(hidden)]
pub mod test_support;

pub use replication::{decompress_gzip, replication_path};
pub use source::{
    API_KEY_HEADER, BasicAuth, DEFAULT_USER_AGENT, HttpChangesetSource, HttpChangesetSourceConfig,
    RemoteEndpoint, SourceBuildError,
};
