//! Request payloads, request assembly and the per-call operation builder.

use graphql_request_transport::{FetchInit, FetchOptions};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ErrorRequest, QueryText};
use crate::{ClientConfig, Document, GraphQLClient, GraphQLError, RawResponse, Result};

/// Media types accepted for GraphQL responses, most specific first.
pub const ACCEPT_GRAPHQL: &str = "application/graphql-response+json, application/json";

/// Variables of a single operation.
pub type Variables = Map<String, Value>;

/// GraphQL request payload, as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// The GraphQL query or mutation.
    pub query: String,
    /// Variables for the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
    /// Operation name, taken from the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    /// Build a payload from a document, deriving the operation name.
    pub fn new(document: &Document, variables: Option<Variables>) -> Self {
        Self {
            query: document.query().to_string(),
            variables,
            operation_name: document.operation_name(),
        }
    }
}

/// The request as seen by request middleware.
///
/// Middleware may change any field; the transport receives whatever comes
/// back. For GET requests the payload query string is appended to `url`
/// after middleware ran.
#[derive(Debug, Clone)]
pub struct RequestInit {
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Serialized payload for POST requests.
    pub body: Option<String>,
    /// Operation name of a single request.
    pub operation_name: Option<String>,
    /// Variables of a single request, or one entry per batch item.
    pub variables: Option<Value>,
    /// Pass-through transport options.
    pub options: FetchOptions,
}

impl RequestInit {
    /// Split into the URL and what the transport needs.
    pub(crate) fn into_fetch(self) -> (String, FetchInit) {
        let init = FetchInit {
            method: self.method,
            headers: self.headers,
            body: self.body,
            options: self.options,
        };
        (self.url, init)
    }
}

/// One logical call: a single operation or a whole batch.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Single(GraphQLRequest),
    Batch(Vec<GraphQLRequest>),
}

impl Payload {
    fn operation_name(&self) -> Option<String> {
        match self {
            Self::Single(request) => request.operation_name.clone(),
            Self::Batch(_) => None,
        }
    }

    fn variables(&self) -> Option<Value> {
        match self {
            Self::Single(request) => request.variables.clone().map(Value::Object),
            Self::Batch(requests) => Some(Value::Array(
                requests
                    .iter()
                    .map(|r| r.variables.clone().map(Value::Object).unwrap_or(Value::Null))
                    .collect(),
            )),
        }
    }

    fn body(&self) -> Result<String> {
        let body = match self {
            Self::Single(request) => serde_json::to_string(request)?,
            Self::Batch(requests) => serde_json::to_string(requests)?,
        };
        Ok(body)
    }

    /// URL-encoded form of the payload for GET requests.
    fn query_string(&self) -> Result<String> {
        let mut params: Vec<(&str, String)> = Vec::new();
        match self {
            Self::Single(request) => {
                params.push(("query", request.query.clone()));
                if let Some(variables) = &request.variables {
                    params.push(("variables", serde_json::to_string(variables)?));
                }
                if let Some(name) = &request.operation_name {
                    params.push(("operationName", name.clone()));
                }
            }
            Self::Batch(requests) => {
                let queries: Vec<&str> = requests.iter().map(|r| r.query.as_str()).collect();
                params.push(("query", serde_json::to_string(&queries)?));
                if let Some(variables) = self.variables() {
                    params.push(("variables", serde_json::to_string(&variables)?));
                }
            }
        }
        serde_urlencoded::to_string(params).map_err(|e| GraphQLError::InvalidVariables(e.to_string()))
    }

    /// Request context attached to errors.
    pub(crate) fn error_request(&self) -> ErrorRequest {
        let query = match self {
            Self::Single(request) => QueryText::Single(request.query.clone()),
            Self::Batch(requests) => {
                QueryText::Batch(requests.iter().map(|r| r.query.clone()).collect())
            }
        };
        ErrorRequest {
            query,
            variables: self.variables(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(requests) => requests.len(),
        }
    }
}

/// Assemble the request for `payload`.
///
/// Returns the init handed to middleware and, for GET, the query string to
/// append once middleware is done.
pub(crate) fn build_request(
    config: &ClientConfig,
    payload: &Payload,
    call_headers: &HeaderMap,
) -> Result<(RequestInit, Option<String>)> {
    let is_get = config.method == Method::GET;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GRAPHQL));
    if !is_get {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    merge_headers(&mut headers, &config.headers);
    merge_headers(&mut headers, call_headers);

    let (body, query_string) = if is_get {
        (None, Some(payload.query_string()?))
    } else {
        (Some(payload.body()?), None)
    };

    let init = RequestInit {
        url: config.endpoint.clone(),
        method: config.method.clone(),
        headers,
        body,
        operation_name: payload.operation_name(),
        variables: payload.variables(),
        options: config.fetch_options.clone(),
    };

    Ok((init, query_string))
}

/// Append an encoded query string to a URL.
pub(crate) fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}

/// Overlay `source` on `target`. Every name present in `source` replaces all
/// values of that name in `target`.
pub(crate) fn merge_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for name in source.keys() {
        target.remove(name);
        for value in source.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

/// Parse a header pair, reporting which part was rejected.
pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::try_from(name)
        .map_err(|e| GraphQLError::InvalidHeader(format!("{}: {}", name, e)))?;
    let header_value = HeaderValue::try_from(value)
        .map_err(|e| GraphQLError::InvalidHeader(format!("{}: {}", name, e)))?;
    Ok((header_name, header_value))
}

/// Convert a serializable value into operation variables.
///
/// `null` means no variables; anything other than an object is rejected.
pub(crate) fn to_variables<T: Serialize>(variables: T) -> Result<Option<Variables>> {
    match serde_json::to_value(variables)? {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(GraphQLError::InvalidVariables(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Builder for a single query or mutation.
///
/// Per-call headers and variables are layered on top of the client's
/// configuration.
pub struct OperationBuilder<'a> {
    client: &'a GraphQLClient,
    document: Document,
    variables: Option<Variables>,
    headers: HeaderMap,
    invalid: Option<GraphQLError>,
}

impl<'a> OperationBuilder<'a> {
    /// Create a new operation builder.
    pub(crate) fn new(client: &'a GraphQLClient, document: Document) -> Self {
        Self {
            client,
            document,
            variables: None,
            headers: HeaderMap::new(),
            invalid: None,
        }
    }

    fn reject(&mut self, error: GraphQLError) {
        if self.invalid.is_none() {
            self.invalid = Some(error);
        }
    }

    /// Set variables. Fields are merged into any variables already set.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Self {
        match to_variables(variables) {
            Ok(Some(map)) => self.variables.get_or_insert_with(Map::new).extend(map),
            Ok(None) => {}
            Err(e) => self.reject(e),
        }
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.variables
                    .get_or_insert_with(Map::new)
                    .insert(name.into(), value);
            }
            Err(e) => self.reject(e.into()),
        }
        self
    }

    /// Add a header for this request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match parse_header(name.as_ref(), value.as_ref()) {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.reject(e),
        }
        self
    }

    /// Add several headers for this request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        merge_headers(&mut self.headers, &headers);
        self
    }

    fn prepare(&mut self) -> Result<Payload> {
        if let Some(error) = self.invalid.take() {
            return Err(error);
        }
        Ok(Payload::Single(GraphQLRequest::new(
            &self.document,
            self.variables.take(),
        )))
    }

    /// Execute the operation and return the response with HTTP metadata.
    pub async fn send_raw(mut self) -> Result<RawResponse> {
        let prepared = self.prepare();
        let (response, ()) = self.client.execute(prepared, self.headers, |_| Ok(())).await?;
        Ok(response)
    }

    /// Execute the operation and deserialize its data.
    ///
    /// Data that does not fit `T` fails the call, and response middleware
    /// sees that failure.
    pub async fn send<T: DeserializeOwned>(mut self) -> Result<T> {
        let prepared = self.prepare();
        let (_, data) = self
            .client
            .execute(prepared, self.headers, RawResponse::data_as::<T>)
            .await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(query: &str, variables: Option<Value>) -> Payload {
        let variables = variables.and_then(|v| to_variables(v).unwrap());
        Payload::Single(GraphQLRequest::new(&Document::from(query), variables))
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = single("query myGqlOperation { users }", Some(json!({"first": 10})));
        let body: Value = serde_json::from_str(&payload.body().unwrap()).unwrap();

        assert_eq!(
            body,
            json!({
                "query": "query myGqlOperation { users }",
                "variables": {"first": 10},
                "operationName": "myGqlOperation"
            })
        );
    }

    #[test]
    fn test_payload_omits_absent_fields() {
        let payload = single("{ users }", None);
        assert_eq!(payload.body().unwrap(), r#"{"query":"{ users }"}"#);
    }

    #[test]
    fn test_batch_body_keeps_order() {
        let payload = Payload::Batch(vec![
            GraphQLRequest::new(&Document::from("query A { a }"), None),
            GraphQLRequest::new(&Document::from("query B { b }"), None),
        ]);
        let body: Value = serde_json::from_str(&payload.body().unwrap()).unwrap();

        assert_eq!(body[0]["operationName"], "A");
        assert_eq!(body[1]["operationName"], "B");
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_build_request_merges_headers() {
        let config = ClientConfig::builder()
            .endpoint("http://localhost/graphql")
            .header("content-type", "application/graphql+json")
            .header("x-client", "config")
            .build()
            .unwrap();

        let mut call_headers = HeaderMap::new();
        call_headers.insert("X-Client", HeaderValue::from_static("call"));

        let (init, query) = build_request(&config, &single("{ a }", None), &call_headers).unwrap();

        assert!(query.is_none());
        assert_eq!(init.url, "http://localhost/graphql");
        assert_eq!(init.method, Method::POST);
        assert_eq!(init.headers["content-type"], "application/graphql+json");
        assert_eq!(init.headers["x-client"], "call");
        assert_eq!(init.headers["accept"], ACCEPT_GRAPHQL);
        assert_eq!(init.headers.get_all("x-client").iter().count(), 1);
    }

    #[test]
    fn test_build_get_request() {
        let config = ClientConfig::builder()
            .endpoint("http://localhost/graphql")
            .method(Method::GET)
            .build()
            .unwrap();

        let payload = single("query Me { me { id } }", Some(json!({"id": 1})));
        let (init, query) = build_request(&config, &payload, &HeaderMap::new()).unwrap();

        assert!(init.body.is_none());
        assert!(init.headers.get(CONTENT_TYPE).is_none());
        let query = query.unwrap();
        assert_eq!(
            query,
            "query=query+Me+%7B+me+%7B+id+%7D+%7D&variables=%7B%22id%22%3A1%7D&operationName=Me"
        );
        assert_eq!(
            append_query(&init.url, &query),
            format!("http://localhost/graphql?{}", query)
        );
    }

    #[test]
    fn test_append_query_to_url_with_params() {
        assert_eq!(append_query("http://h/g?a=1", "b=2"), "http://h/g?a=1&b=2");
        assert_eq!(append_query("http://h/g", ""), "http://h/g");
    }

    #[test]
    fn test_to_variables() {
        assert!(to_variables(json!({"a": 1})).unwrap().is_some());
        assert!(to_variables(Value::Null).unwrap().is_none());
        assert!(matches!(
            to_variables(json!([1, 2])),
            Err(GraphQLError::InvalidVariables(_))
        ));
    }

    #[test]
    fn test_error_request_for_batch() {
        let payload = Payload::Batch(vec![
            GraphQLRequest::new(&Document::from("{ a }"), to_variables(json!({"x": 1})).unwrap()),
            GraphQLRequest::new(&Document::from("{ b }"), None),
        ]);
        let request = payload.error_request();

        assert_eq!(
            request.query,
            QueryText::Batch(vec!["{ a }".to_string(), "{ b }".to_string()])
        );
        assert_eq!(request.variables, Some(json!([{"x": 1}, null])));
    }
}
