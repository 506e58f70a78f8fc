//! # HTTP Retrieval Utilities
//!
//! A robust, asynchronous API client wrapper around `reqwest`, with
//! middleware support for exponential backoff retries and standardized JSON
//! response handling. Requests take absolute URLs: TagStream talks to a
//! handful of independently-configured endpoints rather than one API base.

use reqwest::{header::AUTHORIZATION, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// A standardized container for API responses.
///
/// Wraps the deserialized data along with metadata about the HTTP
/// transaction, such as the status code and whether it was a 2xx.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// A flexible asynchronous HTTP client for one-shot JSON calls.
///
/// Built on top of `reqwest_middleware`, it handles bearer authentication and
/// automatic retries of transient failures.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// An optional Bearer token used for authorization.
    auth_token: Option<String>,
}

impl ApiClient {
    /// Creates a new `ApiClient` with a 3-attempt exponential backoff policy.
    pub fn new(auth_token: Option<String>) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            inner: client,
            auth_token,
        }
    }

    /// Performs a JSON request against an absolute URL and handles the response.
    ///
    /// Injects the bearer token when one is configured, serializes `body` as
    /// JSON when present, and deserializes a 2xx body into `T`. Non-2xx
    /// responses are returned as `Ok` with `success == false` and the raw
    /// error body captured for logging; only transport-level failures map to
    /// `Err`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<B>,
    ) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        // 1. Validate the URL up front so a config typo fails loudly.
        let url = Url::parse(url)?;
        let mut req = self.inner.request(method, url);

        // 2. Inject Bearer Authentication if a token is present
        if let Some(token) = &self.auth_token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        // 3. Serialize and attach the JSON body if present
        if let Some(b) = body {
            use reqwest::header::CONTENT_TYPE;
            let json_body = serde_json::to_string(&b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        // 4. Execute the request and capture response metadata
        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let success = status.is_success();

        if success {
            let data = response.json::<T>().await?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }
}
