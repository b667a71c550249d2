//! GraphQL client configuration.

use std::sync::Arc;

use graphql_request_transport::{Fetch, FetchOptions, ReqwestFetch};
use http::{HeaderMap, Method};
use serde_json::Value;

use crate::middleware::{MiddlewareChain, RequestMiddleware, ResponseMiddleware};
use crate::request::{merge_headers, parse_header};
use crate::{GraphQLError, Result};

/// How GraphQL errors in a 2xx response are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any error fails the call.
    #[default]
    None,
    /// Errors are dropped and the data returned.
    Ignore,
    /// Data and errors are both returned.
    All,
}

/// GraphQL client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,
    /// Headers sent with every request.
    pub headers: HeaderMap,
    /// HTTP method, `POST` unless set to `GET`.
    pub method: Method,
    /// Treatment of GraphQL errors.
    pub error_policy: ErrorPolicy,
    /// Options passed through to the transport.
    pub fetch_options: FetchOptions,
    /// Request and response middleware.
    pub middleware: MiddlewareChain,
    /// Transport performing the HTTP calls.
    pub fetch: Arc<dyn Fetch>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4000/graphql".to_string(),
            headers: HeaderMap::new(),
            method: Method::POST,
            error_policy: ErrorPolicy::None,
            fetch_options: FetchOptions::default(),
            middleware: MiddlewareChain::new(),
            fetch: Arc::new(ReqwestFetch::new()),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("headers", &self.headers)
            .field("method", &self.method)
            .field("error_policy", &self.error_policy)
            .field("fetch_options", &self.fetch_options)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create configuration for a specific endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

/// Builder for GraphQL client configuration.
///
/// Invalid headers are reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
    invalid: Option<GraphQLError>,
}

impl ClientConfigBuilder {
    /// Set the GraphQL endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Add a default header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                self.config.headers.insert(name, value);
            }
            Err(e) => {
                self.invalid.get_or_insert(e);
            }
        }
        self
    }

    /// Add several default headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.config.headers, &headers);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set the HTTP method. `GET` moves the payload into the query string.
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Set the error policy.
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.config.error_policy = policy;
        self
    }

    /// Set the credentials mode passed to the transport.
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.config.fetch_options.credentials = Some(credentials.into());
        self
    }

    /// Set the request mode passed to the transport.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.config.fetch_options.mode = Some(mode.into());
        self
    }

    /// Set the cache mode passed to the transport.
    pub fn cache(mut self, cache: impl Into<String>) -> Self {
        self.config.fetch_options.cache = Some(cache.into());
        self
    }

    /// Set any other transport option.
    pub fn fetch_option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.config.fetch_options.extra.insert(name.into(), value);
        self
    }

    /// Use a custom transport.
    pub fn fetch<F: Fetch + 'static>(mut self, fetch: F) -> Self {
        self.config.fetch = Arc::new(fetch);
        self
    }

    /// Add request middleware.
    pub fn request_middleware<M: RequestMiddleware + 'static>(mut self, middleware: M) -> Self {
        self.config.middleware.push_request(Arc::new(middleware));
        self
    }

    /// Add response middleware.
    pub fn response_middleware<M: ResponseMiddleware + 'static>(mut self, middleware: M) -> Self {
        self.config.middleware.push_response(Arc::new(middleware));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        match self.invalid {
            Some(error) => Err(error),
            None => Ok(self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.method, Method::POST);
        assert_eq!(config.error_policy, ErrorPolicy::None);
        assert!(config.headers.is_empty());
        assert!(config.middleware.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .endpoint("https://api.example.com/graphql")
            .bearer_auth("token123")
            .header("X-Api-Version", "2")
            .method(Method::GET)
            .error_policy(ErrorPolicy::All)
            .credentials("include")
            .cache("no-store")
            .fetch_option("keepalive", json!(true))
            .build()
            .unwrap();

        assert_eq!(config.endpoint, "https://api.example.com/graphql");
        assert_eq!(config.headers["authorization"], "Bearer token123");
        assert_eq!(config.headers["x-api-version"], "2");
        assert_eq!(config.method, Method::GET);
        assert_eq!(config.error_policy, ErrorPolicy::All);
        assert_eq!(config.fetch_options.credentials.as_deref(), Some("include"));
        assert_eq!(config.fetch_options.extra["keepalive"], json!(true));
    }

    #[test]
    fn test_invalid_header_fails_build() {
        let result = ClientConfig::builder().header("bad header", "x").build();
        assert!(matches!(result, Err(GraphQLError::InvalidHeader(_))));
    }
}
