//! Operation relay shared by the HTTP surface.

pub mod service;
pub mod types;

pub use service::{RelayApi, RelayService};
pub use types::RelayError;
