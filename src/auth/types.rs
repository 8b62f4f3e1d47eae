//! Auth credential and token types

use std::fmt;

/// Credentials used to obtain the bearer token
#[derive(Clone)]
pub enum Credentials {
    /// A pre-issued API token. Cannot be refreshed when the server rejects it.
    Token(String),
    /// Username and password; the token is obtained through the login endpoint
    /// and can be re-obtained transparently after a 401.
    Login {
        /// Account username
        username: String,
        /// Account password
        password: String,
    },
}

impl Credentials {
    /// True when a rejected token can be replaced by a fresh login call
    pub fn can_reauthenticate(&self) -> bool {
        matches!(self, Credentials::Login { .. })
    }
}

impl fmt::Debug for Credentials {
    // Never print secrets
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token(***)"),
            Credentials::Login { username, .. } => f
                .debug_struct("Credentials::Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Where a token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Supplied by the caller at construction time
    Static,
    /// Obtained through the login endpoint
    Login,
}

/// The bearer token attached to every authenticated request.
///
/// Tokens are immutable; a refresh replaces the whole value, never parts of it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    /// The opaque bearer value
    pub value: String,
    /// Where the token came from
    pub source: TokenSource,
}

impl AuthToken {
    /// Wrap a caller-supplied token
    pub fn from_static(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: TokenSource::Static,
        }
    }

    /// Wrap a token returned by the login endpoint
    pub fn from_login(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: TokenSource::Login,
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"***")
            .field("source", &self.source)
            .finish()
    }
}
