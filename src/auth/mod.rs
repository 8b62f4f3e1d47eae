//! Authentication
//!
//! Owns the bearer token used by every request and performs the login call
//! when the token is missing or has been rejected.

mod authenticator;
mod types;


pub use authenticator::Authenticator;
pub use types::{AuthToken, Credentials, TokenSource};
