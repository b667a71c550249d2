//! GraphQL client implementation.

use std::sync::Arc;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use graphql_request_transport::{Fetch, FetchResponse};

use crate::classify::{classify_batch, classify_single};
use crate::middleware::ResponseOutcome;
use crate::request::{Payload, append_query, build_request, parse_header};
use crate::{
    BatchRequest, BatchResponse, ClientConfig, Document, OperationBuilder, RawResponse, Result,
};

/// GraphQL client.
///
/// Cheap to clone. Setters change only this instance's configuration; clones
/// and calls already in flight keep the configuration they started with.
#[derive(Debug, Clone)]
pub struct GraphQLClient {
    config: Arc<ClientConfig>,
}

impl GraphQLClient {
    /// Create a new GraphQL client with the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(endpoint))
    }

    /// Create a new GraphQL client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Point the client at another endpoint.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        Arc::make_mut(&mut self.config).endpoint = endpoint.into();
        self
    }

    /// Set a default header, replacing any value with the same name.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<&mut Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        Arc::make_mut(&mut self.config).headers.insert(name, value);
        Ok(self)
    }

    /// Replace all default headers.
    pub fn set_headers(&mut self, headers: HeaderMap) -> &mut Self {
        Arc::make_mut(&mut self.config).headers = headers;
        self
    }

    /// Start a query or mutation.
    pub fn request(&self, document: impl Into<Document>) -> OperationBuilder<'_> {
        OperationBuilder::new(self, document.into())
    }

    /// Send a batch of operations in one HTTP call.
    ///
    /// Errors of individual entries stay in their entries; only a failed call
    /// or a failed response as a whole is returned as an error.
    pub async fn batch_requests(&self, batch: BatchRequest) -> Result<BatchResponse> {
        let config = Arc::clone(&self.config);
        let (payload, headers) = batch.into_parts();

        let result = async {
            let payload = payload?;
            let response = dispatch(&config, &payload, &headers).await?;
            classify_batch(response, payload.error_request(), payload.len())
        }
        .await;

        match &result {
            Ok(batch) => config.middleware.notify(ResponseOutcome::Batch(batch)).await,
            Err(error) => config.middleware.notify(ResponseOutcome::Error(error)).await,
        }
        result
    }

    /// Execute a single operation.
    ///
    /// `extract` runs on the classified response before response middleware
    /// is notified, so a failed conversion is reported as the outcome.
    pub(crate) async fn execute<T, F>(
        &self,
        payload: Result<Payload>,
        headers: HeaderMap,
        extract: F,
    ) -> Result<(RawResponse, T)>
    where
        F: FnOnce(&RawResponse) -> Result<T>,
    {
        let config = Arc::clone(&self.config);

        let result = async {
            let payload = payload?;
            let response = dispatch(&config, &payload, &headers).await?;
            let raw = classify_single(response, payload.error_request(), config.error_policy)?;
            let extracted = extract(&raw)?;
            Ok((raw, extracted))
        }
        .await;

        match &result {
            Ok((response, _)) => config.middleware.notify(ResponseOutcome::Response(response)).await,
            Err(error) => config.middleware.notify(ResponseOutcome::Error(error)).await,
        }
        result
    }
}

impl Default for GraphQLClient {
    fn default() -> Self {
        Self::with_config(ClientConfig::default())
    }
}

/// Build the request, run request middleware and hand it to the transport.
async fn dispatch(config: &ClientConfig, payload: &Payload, headers: &HeaderMap) -> Result<FetchResponse> {
    let (init, query_string) = build_request(config, payload, headers)?;
    let init = config.middleware.apply_request(init).await?;

    debug!(
        endpoint = %init.url,
        method = %init.method,
        operation = ?init.operation_name,
        "Executing GraphQL request"
    );
    if let Some(body) = &init.body {
        trace!(body = %body, "GraphQL request body");
    }

    let (mut url, fetch_init) = init.into_fetch();
    if let Some(query_string) = query_string {
        url = append_query(&url, &query_string);
    }

    let response = config.fetch.fetch(&url, fetch_init).await?;
    debug!(status = %response.status(), "Received GraphQL response");
    Ok(response)
}

/// Send a single operation to `url` and return its data.
///
/// ```rust,no_run
/// use serde_json::{json, Value};
///
/// # async fn run() -> graphql_request::Result<()> {
/// let data: Value = graphql_request::request(
///     "https://api.example.com/graphql",
///     "query GetUser($id: ID!) { user(id: $id) { name } }",
///     Some(json!({"id": "1"})),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn request<T: DeserializeOwned>(
    url: impl Into<String>,
    document: impl Into<Document>,
    variables: Option<Value>,
) -> Result<T> {
    let client = GraphQLClient::new(url);
    with_variables(client.request(document), variables).send().await
}

/// Send a single operation to `url` and return the full response.
pub async fn raw_request(
    url: impl Into<String>,
    document: impl Into<Document>,
    variables: Option<Value>,
) -> Result<RawResponse> {
    let client = GraphQLClient::new(url);
    with_variables(client.request(document), variables).send_raw().await
}

fn with_variables(operation: OperationBuilder<'_>, variables: Option<Value>) -> OperationBuilder<'_> {
    match variables {
        Some(variables) => operation.variables(variables),
        None => operation,
    }
}

/// Send a batch to `url`.
pub async fn batch_requests(url: impl Into<String>, batch: BatchRequest) -> Result<BatchResponse> {
    GraphQLClient::new(url).batch_requests(batch).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_client_creation() {
        let client = GraphQLClient::new("http://localhost:4000/graphql");
        assert_eq!(client.config().endpoint, "http://localhost:4000/graphql");
    }

    #[test]
    fn test_client_with_config() {
        let config = ClientConfig::builder()
            .endpoint("https://api.example.com/graphql")
            .bearer_auth("token123")
            .build()
            .unwrap();

        let client = GraphQLClient::with_config(config);
        assert_eq!(client.config().endpoint, "https://api.example.com/graphql");
        assert_eq!(client.config().headers["authorization"], "Bearer token123");
    }

    #[test]
    fn test_setters_do_not_leak_into_clones() {
        let original = GraphQLClient::new("http://a/graphql");
        let mut changed = original.clone();

        changed
            .set_endpoint("http://b/graphql")
            .set_header("x-tenant", "acme")
            .unwrap();

        assert_eq!(original.config().endpoint, "http://a/graphql");
        assert!(original.config().headers.get("x-tenant").is_none());
        assert_eq!(changed.config().endpoint, "http://b/graphql");
        assert_eq!(changed.config().headers["x-tenant"], "acme");
    }

    #[test]
    fn test_set_headers_replaces_all() {
        let mut client = GraphQLClient::with_config(
            ClientConfig::builder()
                .header("x-old", "1")
                .build()
                .unwrap(),
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-new", HeaderValue::from_static("2"));
        client.set_headers(headers);

        assert!(client.config().headers.get("x-old").is_none());
        assert_eq!(client.config().headers["x-new"], "2");
    }

    #[test]
    fn test_invalid_header_setter() {
        let mut client = GraphQLClient::default();
        assert!(client.set_header("bad header", "x").is_err());
    }
}
