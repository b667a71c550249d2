//! # GraphQL Request Transport
//!
//! The HTTP layer underneath `graphql-request`: a small fetch-style
//! abstraction plus a default implementation on top of reqwest.
//!
//! ## Features
//!
//! - **Pluggable**: anything implementing [`Fetch`] can carry requests,
//!   including plain async closures
//! - **Buffered responses**: [`FetchResponse`] keeps status, case-insensitive
//!   headers and the full body
//! - **Pass-through options**: [`FetchOptions`] travel to the transport
//!   untouched
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphql_request_transport::{Fetch, FetchInit, ReqwestFetch};
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = ReqwestFetch::new();
//!
//!     let mut init = FetchInit::new(Method::POST);
//!     init.body = Some(r#"{"query":"{ me { id } }"}"#.to_string());
//!
//!     let response = transport.fetch("https://api.example.com/graphql", init).await?;
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod fetch;
mod response;

pub use client::ReqwestFetch;
pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{Result, TransportError};
pub use fetch::{Fetch, FetchInit, FetchOptions};
pub use response::FetchResponse;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
