//! Test utilities for changeset sources.
//!
//! This module provides [`RecordedChangesetSource`], a deterministic test
//! double for [`ChangesetSource`] that replays recorded response bodies
//! through the same decoding path as [`super::HttpChangesetSource`] without
//! making HTTP requests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

use change_merger_core::{ChangeDocument, ChangesetSource, FetchError, RemoteKind};

use super::source::decode_body;

/// Replays recorded bodies keyed by remote and changeset id.
///
/// Unknown changesets produce [`FetchError::NotFound`]; registered failures
/// are returned as-is.
///
/// # Example
///
/// ```
/// use change_merger_core::{ChangesetSource, RemoteKind};
/// use change_merger_data::remote::test_support::RecordedChangesetSource;
///
/// let source = RecordedChangesetSource::default()
///     .with_api_body(7, "<osmChange version=\"0.6\"/>");
///
/// assert!(source.fetch_change(RemoteKind::Api, 7).is_ok());
/// assert_eq!(
///     source.fetch_change(RemoteKind::Api, 8).map_err(|err| err.status()),
///     Err(Some(404))
/// );
/// ```
#[derive(Debug, Default)]
pub struct RecordedChangesetSource {
    responses: HashMap<(RemoteKind, u64), Result<Vec<u8>, FetchError>>,
    requests: RefCell<Vec<(RemoteKind, u64)>>,
}

impl RecordedChangesetSource {
    /// Serve `xml` as the API download of `changeset_id`.
    #[must_use]
    pub fn with_api_body(mut self, changeset_id: u64, xml: &str) -> Self {
        self.responses
            .insert((RemoteKind::Api, changeset_id), Ok(xml.as_bytes().to_vec()));
        self
    }

    /// Serve `xml`, gzipped, as the replication diff of `changeset_id`.
    ///
    /// If compression fails the request is answered with
    /// [`FetchError::Decompress`] instead.
    #[must_use]
    pub fn with_replication_body(mut self, changeset_id: u64, xml: &str) -> Self {
        let response = gzip(xml.as_bytes()).map_err(|err| FetchError::Decompress {
            url: recorded_url(RemoteKind::Replication, changeset_id),
            message: err.to_string(),
        });
        self.responses
            .insert((RemoteKind::Replication, changeset_id), response);
        self
    }

    /// Serve raw `body` bytes for `changeset_id` on `remote`.
    #[must_use]
    pub fn with_raw_body(mut self, remote: RemoteKind, changeset_id: u64, body: Vec<u8>) -> Self {
        self.responses.insert((remote, changeset_id), Ok(body));
        self
    }

    /// Fail requests for `changeset_id` on `remote` with `error`.
    #[must_use]
    pub fn with_error(mut self, remote: RemoteKind, changeset_id: u64, error: FetchError) -> Self {
        self.responses.insert((remote, changeset_id), Err(error));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<(RemoteKind, u64)> {
        self.requests.borrow().clone()
    }
}

impl ChangesetSource for RecordedChangesetSource {
    fn fetch_change(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError> {
        self.requests.borrow_mut().push((remote, changeset_id));
        let url = recorded_url(remote, changeset_id);
        match self.responses.get(&(remote, changeset_id)) {
            Some(Ok(body)) => decode_body(remote, &url, body),
            Some(Err(error)) => Err(error.clone()),
            None => Err(FetchError::NotFound { changeset_id, url }),
        }
    }
}

fn recorded_url(remote: RemoteKind, changeset_id: u64) -> String {
    format!("memory://{remote}/{changeset_id}")
}

/// Gzip `data` in memory.
///
/// # Errors
///
/// Returns the encoder's I/O error.
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
