//! The fetch abstraction.

use std::future::Future;

use async_trait::async_trait;
use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FetchResponse, Result};

/// Everything a transport needs to issue one HTTP request, apart from the URL.
#[derive(Debug, Clone)]
pub struct FetchInit {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<String>,
    /// Transport-specific pass-through options.
    pub options: FetchOptions,
}

impl FetchInit {
    /// Create an init with no headers, body or options.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            options: FetchOptions::default(),
        }
    }
}

/// Opaque options handed to the transport untouched.
///
/// Transports interpret what they understand and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Credentials mode (`omit`, `same-origin`, `include`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    /// Request mode (`cors`, `no-cors`, `same-origin`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Cache mode (`default`, `no-store`, `reload`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    /// Any further transport options.
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl FetchOptions {
    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_none()
            && self.mode.is_none()
            && self.cache.is_none()
            && self.extra.is_empty()
    }
}

/// A fetch-compatible transport.
///
/// Any `Fn(String, FetchInit) -> impl Future<Output = Result<FetchResponse>>`
/// closure is a transport, which keeps tests and custom transports short.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform the request and buffer the response.
    async fn fetch(&self, url: &str, init: FetchInit) -> Result<FetchResponse>;
}

#[async_trait]
impl<F, Fut> Fetch for F
where
    F: Fn(String, FetchInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResponse>> + Send + 'static,
{
    async fn fetch(&self, url: &str, init: FetchInit) -> Result<FetchResponse> {
        (self)(url.to_string(), init).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[tokio::test]
    async fn test_closure_is_a_transport() {
        let transport = |url: String, init: FetchInit| async move {
            assert_eq!(url, "http://localhost/graphql");
            assert_eq!(init.method, Method::POST);
            Ok::<_, crate::TransportError>(FetchResponse::new(
                StatusCode::OK,
                HeaderMap::new(),
                init.body.unwrap_or_default(),
            ))
        };

        let mut init = FetchInit::new(Method::POST);
        init.body = Some("ping".to_string());

        let response = transport.fetch("http://localhost/graphql", init).await.unwrap();
        assert_eq!(response.text().unwrap(), "ping");
    }

    #[test]
    fn test_options_flatten_extra() {
        let mut options = FetchOptions {
            cache: Some("no-store".to_string()),
            ..Default::default()
        };
        options
            .extra
            .insert("keepalive".to_string(), Value::Bool(true));

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json, serde_json::json!({"cache": "no-store", "keepalive": true}));
        assert!(!options.is_empty());
        assert!(FetchOptions::default().is_empty());
    }
}
