//! Error taxonomy for relayed operations.

use crate::tigris::{CoercionError, TigrisError};
use crate::token::AuthError;
use thiserror::Error;

/// Errors emitted while relaying an operation or authenticating.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Token exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
    /// The document API could not be reached or returned an undecodable body.
    #[error("Tigris request failed: {0}")]
    Remote(#[from] TigrisError),
    /// A path parameter could not be converted to the required type.
    #[error("Invalid parameter: {0}")]
    Coercion(#[from] CoercionError),
}
