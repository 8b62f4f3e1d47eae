//! Error types for pagefetch
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// HTTP status codes that warrant another attempt.
pub const RETRIED_HTTP_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// The main error type for pagefetch
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[{method}] {url} - HTTP {status} - {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    // ============================================================================
    // Envelope / Contract Errors
    // ============================================================================
    #[error("Malformed page envelope: {message}")]
    Envelope { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Concurrency Errors
    // ============================================================================
    #[error("Page fetch task failed: {message}")]
    Task { message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn status(
        method: &reqwest::Method,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Status {
            method: method.to_string(),
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an envelope error
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }

    /// Create a task error
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Check if this error warrants another attempt.
    ///
    /// Transport-level failures are always retryable; HTTP status failures
    /// only for the codes in [`RETRIED_HTTP_CODES`]. Everything else is
    /// terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Status { status, .. } => RETRIED_HTTP_CODES.contains(status),
            _ => false,
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for pagefetch
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::status(
            &reqwest::Method::GET,
            "https://api.example.com/items",
            404,
            "Not found",
        );
        assert_eq!(
            err.to_string(),
            "[GET] https://api.example.com/items - HTTP 404 - Not found"
        );

        let err = Error::envelope("missing pagination.total_pages");
        assert_eq!(
            err.to_string(),
            "Malformed page envelope: missing pagination.total_pages"
        );
    }

    #[test]
    fn test_is_retryable() {
        for code in RETRIED_HTTP_CODES {
            assert!(Error::status(&reqwest::Method::GET, "/x", code, "").is_retryable());
        }

        assert!(!Error::status(&reqwest::Method::GET, "/x", 400, "").is_retryable());
        assert!(!Error::status(&reqwest::Method::GET, "/x", 401, "").is_retryable());
        assert!(!Error::status(&reqwest::Method::GET, "/x", 404, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
        assert!(!Error::envelope("test").is_retryable());
    }

    #[test]
    fn test_status_code() {
        let err = Error::status(&reqwest::Method::DELETE, "/x", 409, "conflict");
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(Error::auth("nope").status_code(), None);
    }
}
