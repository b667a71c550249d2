//! # GraphQL Request
//!
//! A minimal GraphQL client: send a document and its variables, get the
//! `data` back or a structured error.
//!
//! ## Features
//!
//! - **Content negotiation**: `application/json`, `application/graphql+json`
//!   and `application/graphql-response+json` responses, any charset
//! - **Structured errors**: failures carry the response and the request that
//!   caused them
//! - **Middleware**: rewrite requests before they leave, observe every outcome
//! - **Batching**: several operations in one HTTP call, answers in order
//! - **Pluggable transport**: reqwest by default, any [`Fetch`] otherwise
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphql_request::GraphQLClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct GetUser {
//!     user: User,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GraphQLClient::new("https://api.example.com/graphql");
//!
//!     let data: GetUser = client
//!         .request("query GetUser($id: ID!) { user(id: $id) { name } }")
//!         .variable("id", "123")
//!         .send()
//!         .await?;
//!
//!     println!("User: {}", data.user.name);
//!     Ok(())
//! }
//! ```
//!
//! ## Middleware
//!
//! ```rust,no_run
//! use graphql_request::{ClientConfig, GraphQLClient, request_fn, response_fn};
//!
//! # fn build() -> graphql_request::Result<GraphQLClient> {
//! let config = ClientConfig::builder()
//!     .endpoint("https://api.example.com/graphql")
//!     .request_middleware(request_fn(|mut init| {
//!         init.url.push_str("?tenant=acme");
//!         Ok(init)
//!     }))
//!     .response_middleware(response_fn(|outcome| {
//!         if outcome.is_error() {
//!             eprintln!("GraphQL call failed: {:?}", outcome.status());
//!         }
//!     }))
//!     .build()?;
//!
//! Ok(GraphQLClient::with_config(config))
//! # }
//! ```

mod batch;
mod classify;
mod client;
mod config;
mod document;
mod error;
mod middleware;
mod request;
mod response;

pub use batch::{BatchItem, BatchRequest, BatchResponse};
pub use classify::is_json_content_type;
pub use client::{GraphQLClient, batch_requests, raw_request, request};
pub use config::{ClientConfig, ClientConfigBuilder, ErrorPolicy};
pub use document::{Document, ParsedDocument, gql};
pub use error::{ClientError, ErrorRequest, ErrorResponse, GraphQLError, QueryText, Result};
pub use middleware::{
    AsyncRequestFn, MiddlewareChain, RequestFn, RequestMiddleware, ResponseFn, ResponseMiddleware,
    ResponseOutcome, TracingMiddleware, async_request_fn, request_fn, response_fn,
};
pub use request::{ACCEPT_GRAPHQL, GraphQLRequest, OperationBuilder, RequestInit, Variables};
pub use response::{ErrorLocation, GraphQLResponse, GraphQLResponseError, PathSegment, RawResponse};

// Re-export common types
pub use graphql_request_transport::{
    Fetch, FetchInit, FetchOptions, FetchResponse, ReqwestFetch, TransportConfig, TransportError,
};
pub use http::{HeaderMap, HeaderValue, Method, StatusCode};
pub use serde_json::Value as JsonValue;
