//! HTTP-based `ChangesetSource` for the OSM API and replication mirrors.
//!
//! [`HttpChangesetSource`] implements the synchronous [`ChangesetSource`]
//! trait by blocking on asynchronous `reqwest` calls, keeping the core
//! library embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use change_merger_core::{ChangesetSource, RemoteKind};
//! use change_merger_data::remote::HttpChangesetSource;
//!
//! let source = HttpChangesetSource::new(
//!     "https://api.openstreetmap.org/api/0.6",
//!     "https://osm-replication.example.com/changes",
//! )?;
//! let document = source.fetch_change(RemoteKind::Api, 123_456)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use change_merger_core::{ChangeDocument, ChangesetCodec, ChangesetSource, FetchError, RemoteKind};

use super::replication::{decompress_gzip, replication_path};
use crate::xml::XmlChangesetCodec;

/// Error type for [`HttpChangesetSource`] construction failures.
#[derive(Debug)]
pub enum SourceBuildError {
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for SourceBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for SourceBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for changeset requests.
pub const DEFAULT_USER_AGENT: &str = "change-merger/0.1";

/// Header carrying the optional API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Username and password sent as HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Connection settings for one remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    /// Base URL requests are resolved against.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Value of the `x-api-key` header, if any.
    pub api_key: Option<String>,
    /// Basic auth credentials, if any.
    pub auth: Option<BasicAuth>,
}

impl RemoteEndpoint {
    /// An endpoint at `base_url` with the default timeout and no credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            auth: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `api_key` in the `x-api-key` header.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticate with HTTP basic auth.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn authorise(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        request.timeout(self.timeout)
    }
}

/// Configuration for [`HttpChangesetSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpChangesetSourceConfig {
    /// The editing API, serving `changeset/{id}/download`.
    pub api: RemoteEndpoint,
    /// The replication mirror, serving `{AAA}/{BBB}/{CCC}.osc.gz`.
    pub replication: RemoteEndpoint,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpChangesetSourceConfig {
    /// Create a configuration from the two remotes.
    #[must_use]
    pub fn new(api: RemoteEndpoint, replication: RemoteEndpoint) -> Self {
        Self {
            api,
            replication,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn endpoint(&self, remote: RemoteKind) -> &RemoteEndpoint {
        match remote {
            RemoteKind::Api => &self.api,
            RemoteKind::Replication => &self.replication,
        }
    }
}

/// Request URL for `changeset_id` on `remote`.
fn request_path(remote: RemoteKind, changeset_id: u64) -> String {
    match remote {
        RemoteKind::Api => format!("changeset/{changeset_id}/download"),
        RemoteKind::Replication => replication_path(changeset_id),
    }
}

/// Turn a response body into a document, inflating replication payloads.
pub(crate) fn decode_body(
    remote: RemoteKind,
    url: &str,
    body: &[u8],
) -> Result<ChangeDocument, FetchError> {
    let inflated;
    let bytes = match remote {
        RemoteKind::Api => body,
        RemoteKind::Replication => {
            inflated = decompress_gzip(body).map_err(|err| FetchError::Decompress {
                url: url.to_owned(),
                message: err.to_string(),
            })?;
            inflated.as_slice()
        }
    };
    let text = std::str::from_utf8(bytes).map_err(|err| FetchError::Decode {
        url: url.to_owned(),
        message: err.to_string(),
    })?;
    XmlChangesetCodec
        .decode(text)
        .map_err(|err| FetchError::Decode {
            url: url.to_owned(),
            message: err.to_string(),
        })
}

/// HTTP changeset source backed by `reqwest`.
///
/// It owns a Tokio runtime reused across calls. When called from within an
/// existing multi-threaded Tokio runtime it blocks on that runtime's handle
/// via [`tokio::task::block_in_place`] instead. Inside a `current_thread`
/// runtime the owned runtime drives the request on a scoped helper thread.
pub struct HttpChangesetSource {
    client: Client,
    config: HttpChangesetSourceConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpChangesetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChangesetSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpChangesetSource {
    /// Create a source for the two base URLs with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(
        api_base_url: impl Into<String>,
        replication_base_url: impl Into<String>,
    ) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpChangesetSourceConfig::new(
            RemoteEndpoint::new(api_base_url),
            RemoteEndpoint::new(replication_base_url),
        ))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: HttpChangesetSourceConfig) -> Result<Self, SourceBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &HttpChangesetSourceConfig {
        &self.config
    }

    /// Full request URL for `changeset_id` on `remote`.
    pub fn changeset_url(&self, remote: RemoteKind, changeset_id: u64) -> String {
        self.config
            .endpoint(remote)
            .url(&request_path(remote, changeset_id))
    }

    async fn fetch_async(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError> {
        let endpoint = self.config.endpoint(remote);
        let url = self.changeset_url(remote, changeset_id);
        debug!("requesting changeset {changeset_id} from {url}");

        let mut request = endpoint.authorise(self.client.get(&url));
        if remote == RemoteKind::Api {
            request = request.header(header::ACCEPT, "application/xml");
        }
        let response = request
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, &url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                changeset_id,
                url,
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpError {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(&err, &url))?;
        debug!("received {} bytes from {url}", body.len());
        decode_body(remote, &url, &body)
    }
}

/// Convert a reqwest error to a `FetchError`.
fn convert_reqwest_error(error: &reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout {
            url: url.to_owned(),
        };
    }

    if let Some(status) = error.status() {
        return FetchError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
        };
    }

    FetchError::NetworkError {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

impl ChangesetSource for HttpChangesetSource {
    /// Download and decode a changeset.
    ///
    /// # Runtime requirements
    ///
    /// Callable from any context. On a multi-threaded Tokio runtime the
    /// calling worker blocks in place; on a `current_thread` runtime the
    /// calling thread blocks while a helper thread runs the request.
    fn fetch_change(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| {
                    handle.block_on(self.fetch_async(remote, changeset_id))
                })
            }
            Ok(_) => self.fetch_on_helper_thread(remote, changeset_id),
            Err(_) => self
                .runtime
                .block_on(self.fetch_async(remote, changeset_id)),
        }
    }
}

impl HttpChangesetSource {
    fn fetch_on_helper_thread(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.runtime.block_on(self.fetch_async(remote, changeset_id)))
                .join()
                .unwrap_or_else(|_| {
                    Err(FetchError::NetworkError {
                        url: self.changeset_url(remote, changeset_id),
                        message: "changeset request thread panicked".to_owned(),
                    })
                })
        })
    }
}
