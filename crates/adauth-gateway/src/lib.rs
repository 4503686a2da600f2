//! Request-queue gateway client for the AD authentication bridge.
//!
//! Provides the HTTP client that fetches pending credential-verification
//! requests and reports authentication results back, implementing the
//! [`adauth_core::services::RequestGateway`] capability.

#![deny(missing_docs)]

mod client;

pub use client::{GatewayClient, GatewayClientBuilder};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = adauth_core::Result<T>;
