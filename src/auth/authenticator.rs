//! Authenticator implementation
//!
//! Holds the current bearer token and performs login calls through the shared
//! retry policy. The token is replaced wholesale on refresh; concurrent
//! readers observe either the previous or the new complete token. Concurrent
//! refreshes are not coalesced: two callers that both see a rejected token may
//! both log in, the second login winning the swap.

use super::types::{AuthToken, Credentials};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::urls::build_login_url;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Owns the bearer token and the login flow
pub struct Authenticator {
    credentials: Credentials,
    token: Arc<RwLock<Option<AuthToken>>>,
    http_client: Client,
    login_url: String,
    retry: RetryPolicy,
}

impl Authenticator {
    /// Create an authenticator for the given base URL and credentials.
    ///
    /// A caller-supplied token is held immediately; login credentials leave
    /// the token empty until the first authenticated call.
    pub fn new(base_url: &str, credentials: Credentials, http_client: Client, retry: RetryPolicy) -> Self {
        let token = match &credentials {
            Credentials::Token(value) => Some(AuthToken::from_static(value.clone())),
            Credentials::Login { .. } => None,
        };
        Self {
            credentials,
            token: Arc::new(RwLock::new(token)),
            http_client,
            login_url: build_login_url(base_url),
            retry,
        }
    }

    /// True when a rejected token can be replaced by a fresh login call
    pub fn can_reauthenticate(&self) -> bool {
        self.credentials.can_reauthenticate()
    }

    /// Return a usable token, performing a login call if none is held
    pub async fn ensure_token(&self) -> Result<AuthToken> {
        {
            let held = self.token.read().await;
            if let Some(token) = held.as_ref() {
                return Ok(token.clone());
            }
        }
        self.force_refresh().await
    }

    /// Perform a fresh login call and replace the held token wholesale
    pub async fn force_refresh(&self) -> Result<AuthToken> {
        if !self.can_reauthenticate() {
            return Err(Error::auth(
                "cannot refresh a caller-supplied token, no login credentials configured",
            ));
        }
        let new_token = self.login().await?;
        let mut held = self.token.write().await;
        *held = Some(new_token.clone());
        Ok(new_token)
    }

    /// Perform the login call, retried per the shared retry policy
    async fn login(&self) -> Result<AuthToken> {
        let Credentials::Login { username, password } = &self.credentials else {
            return Err(Error::auth("no login credentials configured"));
        };
        let form = [("username", username.as_str()), ("password", password.as_str())];

        let mut attempt = 1;
        loop {
            let result = self.login_once(&form).await;
            match result {
                Ok(token) => {
                    debug!("login succeeded on attempt {attempt}");
                    return Ok(token);
                }
                Err(error) if self.retry.should_retry(&error) && self.retry.has_budget(attempt) => {
                    let wait = self.retry.wait_before(attempt + 1);
                    warn!(
                        "login attempt {attempt}/{} failed ({error}), retrying in {wait:?}",
                        self.retry.max_attempts
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn login_once(&self, form: &[(&str, &str)]) -> Result<AuthToken> {
        let response = self
            .http_client
            .post(&self.login_url)
            .form(form)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(
                &reqwest::Method::POST,
                &self.login_url,
                status.as_u16(),
                body,
            ));
        }

        let login: LoginResponse = response.json().await.map_err(Error::Http)?;
        Ok(AuthToken::from_login(login.key))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

/// Login endpoint response
#[derive(Debug, Deserialize)]
struct LoginResponse {
    key: String,
}
