//! GraphQL client error types.

use std::collections::BTreeMap;
use std::fmt;

use graphql_request_transport::TransportError;
use http::HeaderMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::GraphQLResponseError;
use crate::response::error_list;

/// Result type for GraphQL client operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;

/// GraphQL client errors.
#[derive(Debug, Error)]
pub enum GraphQLError {
    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with GraphQL errors, a non-2xx status or a body
    /// that could not be parsed.
    #[error("{0}")]
    Client(Box<ClientError>),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Variables did not serialize to a JSON object.
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    /// A header name or value was rejected.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Request middleware failed.
    #[error("Middleware error: {0}")]
    Middleware(String),

    /// The document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GraphQLError {
    /// Check if the transport itself failed.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is an error reported by the server.
    pub fn is_graphql_error(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Get the server error details, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(error) => Some(&**error),
            _ => None,
        }
    }

    /// Get the HTTP status code if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        self.client_error().map(|e| e.response.status)
    }
}

impl From<ClientError> for GraphQLError {
    fn from(error: ClientError) -> Self {
        Self::Client(Box::new(error))
    }
}

/// A failed GraphQL call: what the server answered and what was asked.
#[derive(Debug, Clone, Serialize)]
pub struct ClientError {
    /// The response as received.
    pub response: ErrorResponse,
    /// The request that produced it.
    pub request: ErrorRequest,
}

/// Response half of a [`ClientError`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Partial data, if the server sent any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error payload exactly as sent by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    /// Extensions sent alongside the errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
    /// Raw body text when the body was not valid JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    #[serde(serialize_with = "serialize_headers")]
    pub headers: HeaderMap,
}

/// Request half of a [`ClientError`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRequest {
    /// Query text, or one per item for batches.
    pub query: QueryText,
    /// Variables sent with the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// Query text of a single or batched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryText {
    /// A single document.
    Single(String),
    /// One document per batch item.
    Batch(Vec<String>),
}

impl ClientError {
    /// Message of the first server error, if there is one.
    pub fn first_message(&self) -> Option<&str> {
        self.response
            .errors
            .as_ref()
            .and_then(|errors| errors.get(0))
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
    }

    /// Typed view of the server errors. Entries that are not error objects
    /// are skipped.
    pub fn errors(&self) -> Vec<GraphQLResponseError> {
        error_list(self.response.errors.as_ref())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_message() {
            Some(message) => write!(f, "{}", message)?,
            None => write!(f, "GraphQL Error (Code: {})", self.response.status)?,
        }
        let dump = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, ": {}", dump)
    }
}

impl std::error::Error for ClientError {}

fn serialize_headers<S: Serializer>(headers: &HeaderMap, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let map: BTreeMap<&str, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    map.serialize(serializer)
}
