//! Tigris HTTP API integration.

pub mod client;
pub mod operation;
pub mod payloads;
pub mod types;

pub use client::TigrisClient;
pub use operation::Operation;
pub use payloads::CoercionError;
pub use types::{BearerToken, PLACEHOLDER_TOKEN, RemoteResponse, SessionToken, TigrisError};
