//! GraphQL request batching.

use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::request::{GraphQLRequest, Payload, Variables, merge_headers, parse_header, to_variables};
use crate::{Document, GraphQLError, GraphQLResponse, GraphQLResponseError, Result};

/// One entry of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// The query or mutation.
    pub document: Document,
    /// Variables for this entry.
    pub variables: Option<Variables>,
}

impl BatchItem {
    /// Create an item without variables.
    pub fn new(document: impl Into<Document>) -> Self {
        Self {
            document: document.into(),
            variables: None,
        }
    }

    /// Create an item with variables.
    pub fn with_variables<T: Serialize>(document: impl Into<Document>, variables: T) -> Result<Self> {
        Ok(Self {
            document: document.into(),
            variables: to_variables(variables)?,
        })
    }
}

/// A batch of GraphQL requests sent in one HTTP call.
#[derive(Debug, Default)]
pub struct BatchRequest {
    items: Vec<BatchItem>,
    headers: HeaderMap,
    invalid: Option<GraphQLError>,
}

impl BatchRequest {
    /// Create a new batch request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the batch.
    pub fn with_item(mut self, item: BatchItem) -> Self {
        self.items.push(item);
        self
    }

    /// Add a query to the batch.
    pub fn query(self, document: impl Into<Document>) -> Self {
        self.with_item(BatchItem::new(document))
    }

    /// Add a query with variables to the batch.
    pub fn query_with<T: Serialize>(mut self, document: impl Into<Document>, variables: T) -> Self {
        match BatchItem::with_variables(document, variables) {
            Ok(item) => self.items.push(item),
            Err(e) => self.reject(e),
        }
        self
    }

    /// Add a header for this batch call.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.reject(e),
        }
        self
    }

    /// Add several headers for this batch call.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, &headers);
        self
    }

    fn reject(&mut self, error: GraphQLError) {
        if self.invalid.is_none() {
            self.invalid = Some(error);
        }
    }

    /// Get the number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the items.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Split into the wire payload and the per-call headers.
    pub(crate) fn into_parts(self) -> (Result<Payload>, HeaderMap) {
        let payload = match self.invalid {
            Some(error) => Err(error),
            None => Ok(Payload::Batch(
                self.items
                    .into_iter()
                    .map(|item| GraphQLRequest::new(&item.document, item.variables))
                    .collect(),
            )),
        };
        (payload, self.headers)
    }
}

impl FromIterator<BatchItem> for BatchRequest {
    fn from_iter<I: IntoIterator<Item = BatchItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            ..Default::default()
        }
    }
}

/// Responses of a batch, in request order.
#[derive(Debug, Clone)]
pub struct BatchResponse {
    responses: Vec<GraphQLResponse<Value>>,
    status: StatusCode,
    headers: HeaderMap,
}

impl BatchResponse {
    /// Create a new batch response.
    pub fn new(responses: Vec<GraphQLResponse<Value>>, status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            responses,
            status,
            headers,
        }
    }

    /// HTTP status code of the batch call.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers of the batch call.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the number of responses.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Get a specific response by index.
    pub fn get(&self, index: usize) -> Option<&GraphQLResponse<Value>> {
        self.responses.get(index)
    }

    /// Get the responses.
    pub fn responses(&self) -> &[GraphQLResponse<Value>] {
        &self.responses
    }

    /// Consume and return the responses.
    pub fn into_responses(self) -> Vec<GraphQLResponse<Value>> {
        self.responses
    }

    /// Data of each entry, in order.
    pub fn data(&self) -> Vec<Option<&Value>> {
        self.responses.iter().map(|r| r.data.as_ref()).collect()
    }

    /// Check if any response has errors.
    pub fn has_errors(&self) -> bool {
        self.responses.iter().any(|r| r.has_errors())
    }

    /// Get all errors from all responses.
    pub fn all_errors(&self) -> Vec<GraphQLResponseError> {
        self.responses
            .iter()
            .flat_map(|r| r.error_list())
            .collect()
    }
}

impl IntoIterator for BatchResponse {
    type Item = GraphQLResponse<Value>;
    type IntoIter = std::vec::IntoIter<GraphQLResponse<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResponse {
    type Item = &'a GraphQLResponse<Value>;
    type IntoIter = std::slice::Iter<'a, GraphQLResponse<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_builder() {
        let batch = BatchRequest::new()
            .query("query A { a }")
            .query_with("query B($id: ID!) { b(id: $id) }", json!({"id": "1"}))
            .header("x-batch", "yes");

        assert_eq!(batch.len(), 2);
        let (payload, headers) = batch.into_parts();
        assert_eq!(headers["x-batch"], "yes");

        match payload.unwrap() {
            Payload::Batch(requests) => {
                assert_eq!(requests[0].operation_name.as_deref(), Some("A"));
                assert_eq!(requests[1].variables.as_ref().unwrap()["id"], "1");
            }
            other => panic!("expected batch payload, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_variables_are_reported_on_send() {
        let batch = BatchRequest::new().query_with("{ a }", json!("not an object"));
        let (payload, _) = batch.into_parts();
        assert!(matches!(payload, Err(GraphQLError::InvalidVariables(_))));
    }

    #[test]
    fn test_from_iterator() {
        let batch: BatchRequest = ["{ a }", "{ b }"].into_iter().map(BatchItem::new).collect();
        assert_eq!(batch.items()[1].document.query(), "{ b }");
    }

    #[test]
    fn test_batch_response_accessors() {
        let responses = vec![
            GraphQLResponse {
                data: Some(json!({"a": 1})),
                ..Default::default()
            },
            GraphQLResponse {
                errors: Some(json!([{"message": "nope"}])),
                ..Default::default()
            },
        ];
        let batch = BatchResponse::new(responses, StatusCode::OK, HeaderMap::new());

        assert_eq!(batch.data(), vec![Some(&json!({"a": 1})), None]);
        assert!(batch.has_errors());
        assert_eq!(batch.all_errors()[0].message, "nope");
        assert_eq!(batch.status(), StatusCode::OK);
    }
}
