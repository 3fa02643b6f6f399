//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous GET client wrapper around `reqwest`.
//! It joins relative endpoint paths onto a base URL, encodes query parameters
//! from an ordered list and appends an optional authentication parameter as
//! the final query pair.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// A credential sent as a query parameter instead of an `Authorization` header.
#[derive(Clone)]
pub struct QueryAuth {
    /// Query parameter name, e.g. `remote_auth`.
    pub name: String,
    /// Secret value. Never logged.
    pub value: String,
}

impl QueryAuth {
    /// Creates a new query-string credential.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Debug for QueryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAuth")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// An asynchronous HTTP GET client.
///
/// Handles base URLs, query encoding and query-string authentication.
/// Requests are issued exactly once; there is no retry layer.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying reqwest client.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined. Always ends with `/`.
    base_url: Url,
    /// Credential appended to every request.
    query_auth: Option<QueryAuth>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL (e.g. "https://api.example.com/v1/").
    ///   A missing trailing slash is added so relative paths join under it.
    /// * `query_auth` - Optional credential appended as the last query pair.
    /// * `timeout` - Optional total request timeout. `None` keeps reqwest's default.
    ///
    /// # Errors
    /// Returns an error if the base URL is not absolute or the TLS backend
    /// cannot be initialized.
    pub fn new(
        base_url: &str,
        query_auth: Option<QueryAuth>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            base_url: url,
            query_auth,
        })
    }

    /// The base URL relative paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the absolute request URL.
    ///
    /// `path` is relative to the base URL and may already carry a query
    /// string; `params` are appended after it in order, URL-encoded, and the
    /// authentication pair (if any) comes last.
    pub fn build_url(&self, path: &str, params: &[(&str, String)]) -> anyhow::Result<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;

        if !params.is_empty() || self.query_auth.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
            if let Some(auth) = &self.query_auth {
                pairs.append_pair(&auth.name, &auth.value);
            }
        }

        Ok(url)
    }

    /// Performs a GET request and decodes a 2xx body as JSON into `T`.
    ///
    /// Non-2xx responses are not errors at this level: they come back with
    /// `success: false` and the raw body in `error_body`.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL building, the network exchange or
    /// JSON decoding of a successful body fails.
    pub async fn get<T>(&self, path: &str, params: &[(&str, String)]) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.build_url(path, params)?;
        debug!(path, params = params.len(), "GET");

        let response: reqwest::Response = self.inner.get(url).send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            let data = response.json::<T>().await?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers,
            })
        } else {
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers,
            })
        }
    }
}
