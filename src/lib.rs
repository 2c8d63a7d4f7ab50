#![deny(missing_docs)]

//! Core library for the Tigris relay gateway.

/// HTTP routing and relay handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Relay activity counters.
pub mod metrics;
/// Operation relay service.
pub mod relay;
/// Tigris HTTP API integration.
pub mod tigris;
/// Bearer token acquisition.
pub mod token;
