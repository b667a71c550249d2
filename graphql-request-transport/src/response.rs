//! Fetch response wrapper.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{Result, TransportError};

/// A fully received HTTP response.
///
/// The body is buffered so it can be read as text or JSON any number of
/// times. Header lookups go through [`HeaderMap`] and are case-insensitive.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchResponse {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Create a response from a reqwest response, buffering the body.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| TransportError::Body(e.to_string()))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Body(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(b"ConTENT-type").unwrap(),
            HeaderValue::from_static("apPliCatiON/JSON"),
        );
        let response = FetchResponse::new(StatusCode::OK, headers, "{}");

        assert_eq!(response.content_type(), Some("apPliCatiON/JSON"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("apPliCatiON/JSON"));
    }

    #[test]
    fn test_body_accessors() {
        let response = FetchResponse::new(StatusCode::OK, HeaderMap::new(), r#"{"a":1}"#);
        assert_eq!(response.text().unwrap(), r#"{"a":1}"#);

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["a"], 1);
        assert!(response.is_success());
    }

    #[test]
    fn test_invalid_json_is_body_error() {
        let response = FetchResponse::new(StatusCode::OK, HeaderMap::new(), "not json");
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, TransportError::Body(_)));
    }
}
