//! # Data Retrieval Module
//!
//! Generic HTTP client utilities. The `ky_http::ApiClient` wraps `reqwest`
//! with retry middleware and standardized JSON response handling; it backs
//! every one-shot API call in the project (currently the filter-rule
//! registration). The long-lived streaming GET deliberately does not go
//! through it: retry middleware has no business wrapping an unbounded
//! response body.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client with retry middleware for resilient network requests.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiResponse};
