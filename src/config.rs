//! Client configuration

use crate::auth::Credentials;
use crate::fetch::DEFAULT_MAX_IN_FLIGHT_REQUESTS;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Configuration for [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Credentials used to obtain the bearer token
    pub credentials: Credentials,
    /// Request timeout; no timeout when `None`
    pub timeout: Option<Duration>,
    /// Retry policy shared by every logical call
    pub retry: RetryPolicy,
    /// Width of the bounded concurrency limiter for page requests
    pub max_in_flight_requests: usize,
    /// User agent string
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default retry and concurrency settings
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout: None,
            retry: RetryPolicy::default(),
            max_in_flight_requests: DEFAULT_MAX_IN_FLIGHT_REQUESTS,
            user_agent: format!("pagefetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the concurrency limiter width
    #[must_use]
    pub fn max_in_flight_requests(mut self, width: usize) -> Self {
        self.max_in_flight_requests = width;
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new(
            "https://api.example.com/v1",
            Credentials::Token("tok".to_string()),
        );
        assert_eq!(config.base_url, "https://api.example.com/v1");
        assert!(config.timeout.is_none());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.max_in_flight_requests, 4);
        assert!(config.user_agent.starts_with("pagefetch/"));
    }

    #[test]
    fn test_config_setters() {
        let config = ClientConfig::new(
            "https://api.example.com/v1",
            Credentials::Token("tok".to_string()),
        )
        .timeout(Duration::from_secs(10))
        .max_in_flight_requests(8)
        .user_agent("custom/1.0");

        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.max_in_flight_requests, 8);
        assert_eq!(config.user_agent, "custom/1.0");
    }
}
