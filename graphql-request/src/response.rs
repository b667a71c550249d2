//! GraphQL response types.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Result;

/// GraphQL response body as sent by the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GraphQLResponse<T = Value> {
    /// The data returned by the query/mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Errors returned by the server, untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    /// Extensions (for tracing, caching info, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl<T> GraphQLResponse<T> {
    /// Check if the response carries errors.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(is_truthy)
    }

    /// Get the data, ignoring any errors.
    pub fn data(self) -> Option<T> {
        self.data
    }

    /// Typed view of the errors. Entries that do not look like GraphQL errors
    /// are skipped.
    pub fn error_list(&self) -> Vec<GraphQLResponseError> {
        error_list(self.errors.as_ref())
    }
}

/// Successful response together with HTTP metadata.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The data returned by the query/mutation.
    pub data: Option<Value>,
    /// Errors, only kept under [`ErrorPolicy::All`](crate::ErrorPolicy::All).
    pub errors: Option<Value>,
    /// Extensions.
    pub extensions: Option<Value>,
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

impl RawResponse {
    /// Deserialize the data into a concrete type. Missing data reads as `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Check if errors were kept in the response.
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(is_truthy)
    }

    /// Typed view of the errors.
    pub fn error_list(&self) -> Vec<GraphQLResponseError> {
        error_list(self.errors.as_ref())
    }
}

/// Typed view over one entry of a server's `errors` array.
///
/// Servers omit `locations` and `path` freely, or send them as `null`; both
/// read as empty.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphQLResponseError {
    /// Error message.
    pub message: String,
    /// Positions in the document the error refers to.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub locations: Vec<ErrorLocation>,
    /// Response path of the field that failed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: Vec<PathSegment>,
    /// Server-specific details, untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLResponseError {
    /// The path in accessor form, e.g. `users[0].name`.
    pub fn path_string(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        let mut rendered = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) if rendered.is_empty() => rendered.push_str(key),
                PathSegment::Key(key) => {
                    rendered.push('.');
                    rendered.push_str(key);
                }
                PathSegment::Index(index) => rendered.push_str(&format!("[{}]", index)),
            }
        }
        Some(rendered)
    }
}

impl std::fmt::Display for GraphQLResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if let Some(path) = self.path_string() {
            write!(f, " (path: {})", path)?;
        }
        let positions: Vec<String> = self
            .locations
            .iter()
            .map(|location| format!("{}:{}", location.line, location.column))
            .collect();
        if !positions.is_empty() {
            write!(f, " at {}", positions.join(", "))?;
        }
        Ok(())
    }
}

/// Line and column in the document, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One step of a response path: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether an `errors` value counts as present. Empty arrays do not.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

pub(crate) fn error_list(errors: Option<&Value>) -> Vec<GraphQLResponseError> {
    match errors {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        Some(item @ Value::Object(_)) => serde_json::from_value(item.clone())
            .map(|error| vec![error])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
