//! HTTP request executor with retry and transparent re-authentication
//!
//! Each logical call runs as an explicit attempt loop:
//! 1. read the current bearer token (logging in when none is held)
//! 2. perform the transport call
//! 3. on a 401 with login credentials, refresh the token and retry once
//!    immediately (the forced retry consumes an attempt but no backoff wait)
//! 4. on a retryable status or transport failure, wait per the retry policy
//! 5. any other non-2xx status is terminal and carries method/url/status/body

use crate::auth::Authenticator;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::urls::enforce_domain;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stream of raw body chunks from a streaming call
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Create an empty request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Replace the query parameters wholesale
    #[must_use]
    pub fn query_map(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Set the JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes logical HTTP calls against the API.
///
/// Cheap to clone; clones share the underlying connection pool and the
/// authenticator.
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    base_url: String,
    authenticator: Arc<Authenticator>,
    retry: RetryPolicy,
}

impl RequestExecutor {
    /// Create an executor over the given transport client and authenticator
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        authenticator: Arc<Authenticator>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            authenticator,
            retry,
        }
    }

    /// The authenticator shared by all calls
    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    /// Perform one logical call and return the successful response
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let url = enforce_domain(url, &self.base_url);
        let mut attempt = 1;
        loop {
            let outcome = self.send_once(&method, &url, &config).await;
            match self.evaluate(outcome, &method, &url, attempt).await? {
                Evaluation::Done(response) => return Ok(response),
                Evaluation::RetryAfter(wait) => {
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Evaluation::RetryNow => attempt += 1,
            }
        }
    }

    /// Perform one logical call and parse the JSON body.
    ///
    /// A 204 No Content response maps to an empty JSON object.
    pub async fn request_json(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Value> {
        let response = self.request(method, url, config).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        let json = response.json().await.map_err(Error::Http)?;
        Ok(json)
    }

    /// Perform a streaming call and return the body as a chunk stream.
    ///
    /// Retry and re-authentication protect the call up to the point the
    /// stream begins; once chunks flow, a failure propagates without retry.
    pub async fn stream(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<ByteStream> {
        let response = self.request(method, url, config).await?;
        Ok(Box::pin(response.bytes_stream().map_err(Error::Http)))
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<Response> {
        let token = self.authenticator.ensure_token().await?;
        let mut req = self
            .client
            .request(method.clone(), url)
            .bearer_auth(&token.value);
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }
        req.send().await.map_err(Error::Http)
    }

    /// Decide what to do with one attempt's outcome.
    async fn evaluate(
        &self,
        outcome: Result<Response>,
        method: &Method,
        url: &str,
        attempt: u32,
    ) -> Result<Evaluation> {
        match outcome {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::UNAUTHORIZED && self.authenticator.can_reauthenticate() {
                    warn!("got 401 for {method} {url}, re-authenticating");
                    self.authenticator.force_refresh().await?;
                    if attempt == 1 {
                        // Forced retry: re-run immediately with the new token,
                        // still bounded by the shared attempt counter.
                        return Ok(Evaluation::RetryNow);
                    }
                }
                if self.retry.is_retryable_status(status) && self.retry.has_budget(attempt) {
                    let wait = self.retry.wait_before(attempt + 1);
                    warn!(
                        "{method} {url} returned {}, attempt {attempt}/{}, retrying in {wait:?}",
                        status.as_u16(),
                        self.retry.max_attempts
                    );
                    return Ok(Evaluation::RetryAfter(wait));
                }
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::status(method, url, status.as_u16(), body));
                }
                debug!("{method} {url} succeeded on attempt {attempt}");
                Ok(Evaluation::Done(response))
            }
            Err(error) => {
                if self.retry.should_retry(&error) && self.retry.has_budget(attempt) {
                    let wait = self.retry.wait_before(attempt + 1);
                    warn!(
                        "{method} {url} failed ({error}), attempt {attempt}/{}, retrying in {wait:?}",
                        self.retry.max_attempts
                    );
                    return Ok(Evaluation::RetryAfter(wait));
                }
                // Budget exhausted or terminal: surface the failure unchanged
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Per-attempt transition of the request state machine
enum Evaluation {
    /// The call succeeded
    Done(Response),
    /// Retry after the given backoff wait
    RetryAfter(std::time::Duration),
    /// Retry immediately with a refreshed token
    RetryNow,
}
