//! Default transport built on reqwest.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::{Fetch, FetchInit, FetchResponse, Result, TransportConfig};

/// Transport that performs requests with a shared [`reqwest::Client`].
///
/// Browser-only [`FetchOptions`](crate::FetchOptions) such as `credentials`,
/// `mode` and `cache` have no reqwest counterpart and are ignored.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    inner: reqwest::Client,
}

impl ReqwestFetch {
    /// Create a transport with default reqwest settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport from a configuration.
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .gzip(config.gzip);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, url: &str, init: FetchInit) -> Result<FetchResponse> {
        let url = url::Url::parse(url)?;
        debug!(method = %init.method, url = %url, "Sending HTTP request");

        if !init.options.is_empty() {
            trace!(options = ?init.options, "Ignoring fetch options unsupported by reqwest");
        }

        let mut request = self.inner.request(init.method, url).headers(init.headers);
        if let Some(body) = init.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), "Received HTTP response");

        FetchResponse::from_reqwest(response).await
    }
}
