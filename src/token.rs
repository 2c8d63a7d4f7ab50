//! Bearer token acquisition and the shared token slot.
//!
//! [`TokenManager`] runs the client-credentials exchange on demand and keeps the most recent
//! token. There is no automatic refresh and no expiry enforcement: callers re-authenticate
//! explicitly, and the last successful exchange wins.

use crate::tigris::{BearerToken, SessionToken, TigrisClient};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by the client-credentials exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth endpoint answered with a non-success status.
    #[error("Token exchange rejected ({status}): {body}")]
    Rejected {
        /// Status returned by the auth endpoint.
        status: StatusCode,
        /// Raw body returned by the auth endpoint.
        body: String,
    },
    /// The auth endpoint succeeded but omitted `access_token` or `expires_in`.
    #[error("Malformed token response: {0}")]
    MalformedResponse(String),
    /// The request never produced a response.
    #[error("Token request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Client secret that keeps itself out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wrap a raw secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw secret. Callers must avoid logging this string.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientSecret").field(&"<redacted>").finish()
    }
}

impl fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Source of the bearer token attached to relayed calls.
#[async_trait]
pub trait TokenProvider {
    /// Token to attach right now; the placeholder until a refresh succeeds.
    async fn current(&self) -> BearerToken;

    /// Obtain a new token and make it current.
    ///
    /// On failure the previously current token stays in place.
    async fn refresh(&self) -> Result<SessionToken, AuthError>;
}

/// Token provider backed by the Tigris client-credentials exchange.
pub struct TokenManager {
    client: TigrisClient,
    client_id: String,
    client_secret: ClientSecret,
    slot: RwLock<BearerToken>,
}

impl TokenManager {
    /// Create a manager holding the placeholder token.
    pub fn new(client: TigrisClient, client_id: String, client_secret: ClientSecret) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            slot: RwLock::new(BearerToken::placeholder()),
        }
    }
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn current(&self) -> BearerToken {
        self.slot.read().await.clone()
    }

    async fn refresh(&self) -> Result<SessionToken, AuthError> {
        let session = self
            .client
            .exchange_token(&self.client_id, &self.client_secret)
            .await?;
        *self.slot.write().await = session.token.clone();
        tracing::info!(expires_in = session.expires_in, "Bearer token refreshed");
        Ok(session)
    }
}
