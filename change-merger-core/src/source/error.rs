use thiserror::Error;

/// Errors from [`crate::source::ChangesetSource::fetch_change`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote has no changeset with the requested id.
    #[error("changeset {changeset_id} was not found at {url}")]
    NotFound { changeset_id: u64, url: String },
    /// The remote answered with a non-success status other than 404.
    #[error("request to {url} failed with HTTP status {status}")]
    HttpError { url: String, status: u16 },
    /// The request did not complete in time.
    #[error("request to {url} timed out")]
    Timeout { url: String },
    /// The request failed before any response arrived.
    #[error("network error calling {url}: {message}")]
    NetworkError { url: String, message: String },
    /// The body could not be decompressed.
    #[error("failed to decompress changeset from {url}: {message}")]
    Decompress { url: String, message: String },
    /// The body is not a readable osmChange document.
    #[error("failed to decode changeset from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// HTTP-style status describing the failure, if any.
    ///
    /// Remote statuses are passed through; a timeout maps to 504 and a
    /// connection failure to 502. Body failures carry no status.
    ///
    /// # Examples
    /// ```
    /// use change_merger_core::FetchError;
    ///
    /// let err = FetchError::Timeout { url: "http://osm.test".into() };
    /// assert_eq!(err.status(), Some(504));
    /// ```
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::HttpError { status, .. } => Some(*status),
            Self::Timeout { .. } => Some(504),
            Self::NetworkError { .. } => Some(502),
            Self::Decompress { .. } | Self::Decode { .. } => None,
        }
    }

    /// The URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url, .. }
            | Self::HttpError { url, .. }
            | Self::Timeout { url }
            | Self::NetworkError { url, .. }
            | Self::Decompress { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }
}

/// Error returned when parsing a [`crate::RemoteKind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown remote {value:?} (expected api or replication)")]
pub struct ParseRemoteKindError {
    /// The rejected input.
    pub value: String,
}
