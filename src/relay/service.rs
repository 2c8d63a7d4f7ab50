//! Relay service coordinating the token provider, Tigris transport, and metrics.

use crate::{
    config::Config,
    metrics::{MetricsSnapshot, RelayMetrics},
    relay::types::RelayError,
    tigris::{Operation, RemoteResponse, SessionToken, TigrisClient},
    token::{TokenManager, TokenProvider},
};
use async_trait::async_trait;

/// Forwards operations to Tigris with whatever token is current.
///
/// Construct once near process start and share it through an `Arc`.
pub struct RelayService {
    tokens: Box<dyn TokenProvider + Send + Sync>,
    client: TigrisClient,
    metrics: RelayMetrics,
}

/// Abstraction over the relay used by the HTTP surface.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Run the client-credentials exchange and make the new token current.
    async fn authenticate(&self) -> Result<SessionToken, RelayError>;

    /// Forward one operation and return the remote response unmodified.
    async fn relay(&self, operation: Operation) -> Result<RemoteResponse, RelayError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl RelayService {
    /// Build a relay from explicit parts.
    pub fn new(client: TigrisClient, tokens: Box<dyn TokenProvider + Send + Sync>) -> Self {
        Self {
            tokens,
            client,
            metrics: RelayMetrics::new(),
        }
    }

    /// Build a relay whose tokens come from the configured client credentials.
    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        let client = TigrisClient::from_config(config)?;
        let tokens = TokenManager::new(
            client.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        Ok(Self::new(client, Box::new(tokens)))
    }
}

#[async_trait]
impl RelayApi for RelayService {
    async fn authenticate(&self) -> Result<SessionToken, RelayError> {
        let result = self.tokens.refresh().await;
        self.metrics.record_authentication(result.is_ok());
        if let Err(err) = &result {
            tracing::error!(error = %err, "Authentication failed");
        }
        Ok(result?)
    }

    async fn relay(&self, operation: Operation) -> Result<RemoteResponse, RelayError> {
        let token = self.tokens.current().await;
        if token.is_placeholder() {
            tracing::debug!(
                operation = operation.name(),
                "Relaying without a token; authenticate first"
            );
        }

        match self.client.forward(&token, &operation).await {
            Ok(response) => {
                self.metrics.record_forwarded(response.status.is_success());
                Ok(response)
            }
            Err(err) => {
                self.metrics.record_transport_failure();
                tracing::error!(
                    operation = operation.name(),
                    target = operation.target(),
                    error = %err,
                    "Relay failed"
                );
                Err(err.into())
            }
        }
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
