//! Request execution
//!
//! Issues one logical HTTP call, composing the retry policy and the
//! authenticator, and maps transport/HTTP failures into typed errors.

mod executor;


pub use executor::{ByteStream, RequestConfig, RequestExecutor};
