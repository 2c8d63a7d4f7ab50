//! Shared types used by the Tigris client and the relay.

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Value held in the token slot until the first successful authentication.
///
/// The remote API rejects it, and that rejection is relayed to the caller unchanged.
pub const PLACEHOLDER_TOKEN: &str = ".";

/// Errors returned while interacting with the Tigris HTTP API.
#[derive(Debug, Error)]
pub enum TigrisError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Tigris URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Tigris answered with a body that is not JSON.
    #[error("Undecodable Tigris response ({status}): {body}")]
    UndecodableBody {
        /// HTTP status returned from Tigris.
        status: StatusCode,
        /// Raw body text.
        body: String,
    },
}

/// Decoded response from the remote API, relayed without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    /// Status returned by the remote API.
    pub status: StatusCode,
    /// Decoded JSON body; `null` when the remote sent no body.
    pub body: Value,
}

/// Bearer credential attached to outbound requests.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw access token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Unauthenticated value used before any token exchange succeeded.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TOKEN)
    }

    /// Whether this is still the unauthenticated placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_TOKEN
    }

    /// Raw token value. Callers must avoid logging this string.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Default for BearerToken {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

/// Token issued by the client-credentials exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Access token to present as a bearer credential.
    pub token: BearerToken,
    /// Lifetime reported by the remote service, in seconds. Not enforced locally.
    pub expires_in: u64,
}
