//! # pagefetch
//!
//! Async client engine for paginated, token-authenticated REST APIs.
//!
//! The engine turns "fetch all items of a collection, possibly
//! filtered/sorted/sideloaded" into a correctly ordered, memory-bounded,
//! concurrently-fetched stream of records, while transparently handling
//! token expiry and transient-failure retry and while embedding side-loaded
//! related entities into each record.
//!
//! ## Features
//!
//! - **Ordered concurrent pagination**: pages 2..N fetched under a bounded
//!   concurrency limiter, records always yielded in sequential-fetch order
//! - **Transparent auth**: login on first use, forced re-login on 401
//! - **Retry with backoff**: exponential backoff plus jitter for transport
//!   failures and retryable status codes
//! - **Sideload embedding**: direct and nested-by-owner groups merged back
//!   into their primary records
//! - **Streaming export**: binary exports forwarded chunk by chunk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use pagefetch::{ApiClient, ClientConfig, Credentials, ListQuery};
//!
//! #[tokio::main]
//! async fn main() -> pagefetch::Result<()> {
//!     let config = ClientConfig::new(
//!         "https://api.example.com/v1",
//!         Credentials::Login {
//!             username: "user".into(),
//!             password: "secret".into(),
//!         },
//!     );
//!     let client = ApiClient::new(config)?;
//!
//!     let query = ListQuery::new()
//!         .ordering("-created_at")
//!         .sideload("documents")
//!         .filter("status", "exported");
//!     let mut records = client.fetch_all("invoices", &query).await?;
//!     while let Some(record) = records.try_next().await? {
//!         // Records arrive in page order, page 1 after one round trip
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Client configuration
pub mod config;

/// Retry policy
pub mod retry;

/// Authentication and token lifecycle
pub mod auth;

/// Request execution with retry and re-authentication
pub mod http;

/// Sideload embedding
pub mod sideload;

/// Paginated fetching
pub mod fetch;

/// URL building and parsing helpers
pub mod urls;

/// High-level API client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{AuthToken, Authenticator, Credentials, TokenSource};
pub use client::{ApiClient, Export, ExportFormat};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fetch::{ListQuery, PageEnvelope, PageFetcher, RecordStream, DEFAULT_PAGE_SIZE};
pub use http::{ByteStream, RequestConfig, RequestExecutor};
pub use retry::RetryPolicy;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
