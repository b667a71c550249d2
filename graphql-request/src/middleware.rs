//! Request and response middleware.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;

use crate::{BatchResponse, GraphQLError, RawResponse, RequestInit, Result};

/// Middleware run before the transport call.
///
/// Receives the fully assembled request and returns the one to send. An
/// error aborts the call.
#[async_trait]
pub trait RequestMiddleware: Send + Sync {
    /// Inspect and optionally modify the request.
    async fn on_request(&self, request: RequestInit) -> Result<RequestInit>;
}

/// Middleware run once the response has been classified.
///
/// Sees successes and failures alike. It cannot change the outcome.
#[async_trait]
pub trait ResponseMiddleware: Send + Sync {
    /// Observe the outcome of a call.
    async fn on_response(&self, outcome: ResponseOutcome<'_>);
}

/// What a call produced, as handed to response middleware.
#[derive(Debug, Clone, Copy)]
pub enum ResponseOutcome<'a> {
    /// A single operation succeeded.
    Response(&'a RawResponse),
    /// A batch call succeeded.
    Batch(&'a BatchResponse),
    /// The call failed.
    Error(&'a GraphQLError),
}

impl ResponseOutcome<'_> {
    /// Check if the call failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// HTTP status code, when a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Response(response) => Some(response.status),
            Self::Batch(batch) => Some(batch.status()),
            Self::Error(error) => error
                .status_code()
                .and_then(|code| StatusCode::from_u16(code).ok()),
        }
    }
}

/// Request middleware from a synchronous closure.
pub struct RequestFn<F>(F);

/// Wrap a synchronous closure as request middleware.
pub fn request_fn<F>(f: F) -> RequestFn<F>
where
    F: Fn(RequestInit) -> Result<RequestInit> + Send + Sync,
{
    RequestFn(f)
}

#[async_trait]
impl<F> RequestMiddleware for RequestFn<F>
where
    F: Fn(RequestInit) -> Result<RequestInit> + Send + Sync,
{
    async fn on_request(&self, request: RequestInit) -> Result<RequestInit> {
        (self.0)(request)
    }
}

/// Request middleware from an async closure.
pub struct AsyncRequestFn<F>(F);

/// Wrap an async closure as request middleware.
pub fn async_request_fn<F, Fut>(f: F) -> AsyncRequestFn<F>
where
    F: Fn(RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestInit>> + Send + 'static,
{
    AsyncRequestFn(f)
}

#[async_trait]
impl<F, Fut> RequestMiddleware for AsyncRequestFn<F>
where
    F: Fn(RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RequestInit>> + Send + 'static,
{
    async fn on_request(&self, request: RequestInit) -> Result<RequestInit> {
        (self.0)(request).await
    }
}

/// Response middleware from a closure.
pub struct ResponseFn<F>(F);

/// Wrap a closure as response middleware.
pub fn response_fn<F>(f: F) -> ResponseFn<F>
where
    F: Fn(ResponseOutcome<'_>) + Send + Sync,
{
    ResponseFn(f)
}

#[async_trait]
impl<F> ResponseMiddleware for ResponseFn<F>
where
    F: Fn(ResponseOutcome<'_>) + Send + Sync,
{
    async fn on_response(&self, outcome: ResponseOutcome<'_>) {
        (self.0)(outcome)
    }
}

/// Logs every request and its outcome through `tracing`.
#[derive(Debug, Default)]
pub struct TracingMiddleware {
    log_headers: bool,
}

impl TracingMiddleware {
    /// Create a new tracing middleware.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request headers.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

#[async_trait]
impl RequestMiddleware for TracingMiddleware {
    async fn on_request(&self, request: RequestInit) -> Result<RequestInit> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            "Sending GraphQL request"
        );

        if self.log_headers {
            for (name, value) in &request.headers {
                tracing::trace!(header = %name, value = ?value, "Request header");
            }
        }

        Ok(request)
    }
}

#[async_trait]
impl ResponseMiddleware for TracingMiddleware {
    async fn on_response(&self, outcome: ResponseOutcome<'_>) {
        match outcome {
            ResponseOutcome::Error(error) => {
                tracing::debug!(status = ?outcome.status(), error = %error, "GraphQL request failed")
            }
            _ => tracing::debug!(status = ?outcome.status(), "GraphQL request succeeded"),
        }
    }
}

/// Ordered request and response middleware of a client.
///
/// Request middleware runs in registration order, each one receiving the
/// previous one's output. Response middleware is notified in the same order.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl MiddlewareChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append request middleware.
    pub fn with_request<M: RequestMiddleware + 'static>(mut self, middleware: M) -> Self {
        self.request.push(Arc::new(middleware));
        self
    }

    /// Append response middleware.
    pub fn with_response<M: ResponseMiddleware + 'static>(mut self, middleware: M) -> Self {
        self.response.push(Arc::new(middleware));
        self
    }

    pub(crate) fn push_request(&mut self, middleware: Arc<dyn RequestMiddleware>) {
        self.request.push(middleware);
    }

    pub(crate) fn push_response(&mut self, middleware: Arc<dyn ResponseMiddleware>) {
        self.response.push(middleware);
    }

    /// Check if the chain has no middleware at all.
    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }

    /// Run the request through every request middleware.
    pub async fn apply_request(&self, mut request: RequestInit) -> Result<RequestInit> {
        for middleware in &self.request {
            request = middleware.on_request(request).await?;
        }
        Ok(request)
    }

    /// Notify every response middleware.
    pub async fn notify(&self, outcome: ResponseOutcome<'_>) {
        for middleware in &self.response {
            middleware.on_response(outcome).await;
        }
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .finish()
    }
}
