//! Retry policy
//!
//! Decides whether a failed attempt should be repeated and how long to wait
//! before the next one.

mod policy;


pub use policy::RetryPolicy;
