//! Error types for the authentication bridge.
//!
//! This module provides the error hierarchy shared by every crate in the
//! workspace, including stable error codes for structured logging and a
//! failure-scope classification separating request-scoped, connection-scoped
//! and process-fatal errors.

use thiserror::Error;

/// Main error type for bridge operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Startup configuration is missing or malformed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Initial directory connection or administrative bind failed
    #[error("Directory connection failed: {0}")]
    ConnectionError(String),

    /// A per-request directory bind was rejected
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// A directory search could not be executed or produced a malformed entry
    #[error("Directory lookup failed: {0}")]
    LookupError(String),

    /// User or group absent from the directory
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fetching pending credential requests failed
    #[error("Failed to fetch pending requests: {0}")]
    FetchError(String),

    /// Reporting an authentication result was rejected by the gateway
    #[error("Failed to send result: status {status}: {body}")]
    SendError {
        /// HTTP status code returned by the gateway
        status: u16,
        /// Response body accompanying the rejection
        body: String,
    },

    /// Gateway transport failure outside of a status-bearing response
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out at the transport layer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A response body could not be parsed
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Wrapped directory backend error
    #[error("Directory operation `{operation}` failed: {message}")]
    DirectoryError {
        /// Directory operation that failed (bind, search, unbind)
        operation: String,
        /// Error message from the backend
        message: String,
    },
}

/// Specialized result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an error by the part of the system it invalidates.
///
/// The propagation policy treats every error as terminal; the scope exists so
/// logs and a future dispatch can distinguish a bad credential from a dead
/// connection or an unusable process configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    /// Scoped to a single credential request
    Request,
    /// Invalidates the directory or gateway connection
    Connection,
    /// The process cannot run at all
    Process,
}

impl Error {
    /// Returns the stable error code for this error kind.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ConnectionError(_) => "CONNECTION_ERROR",
            Self::AuthenticationError(_) => "AUTHENTICATION_ERROR",
            Self::LookupError(_) => "LOOKUP_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::FetchError(_) => "FETCH_ERROR",
            Self::SendError { .. } => "SEND_ERROR",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::DirectoryError { .. } => "DIRECTORY_ERROR",
        }
    }

    /// Returns the failure scope for this error kind.
    #[must_use]
    pub const fn scope(&self) -> FailureScope {
        match self {
            Self::ConfigError(_) | Self::ConnectionError(_) => FailureScope::Process,
            Self::FetchError(_)
            | Self::HttpError(_)
            | Self::Timeout(_)
            | Self::DirectoryError { .. } => FailureScope::Connection,
            Self::AuthenticationError(_)
            | Self::LookupError(_)
            | Self::NotFound(_)
            | Self::SendError { .. }
            | Self::ParseError(_) => FailureScope::Request,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::ConnectionError("test".to_string()).error_code(),
            "CONNECTION_ERROR"
        );
        assert_eq!(
            Error::AuthenticationError("test".to_string()).error_code(),
            "AUTHENTICATION_ERROR"
        );
        assert_eq!(
            Error::LookupError("test".to_string()).error_code(),
            "LOOKUP_ERROR"
        );
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            Error::FetchError("test".to_string()).error_code(),
            "FETCH_ERROR"
        );
        assert_eq!(
            Error::SendError {
                status: 500,
                body: "boom".to_string()
            }
            .error_code(),
            "SEND_ERROR"
        );
        assert_eq!(
            Error::DirectoryError {
                operation: "bind".to_string(),
                message: "msg".to_string()
            }
            .error_code(),
            "DIRECTORY_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::AuthenticationError("invalid credentials".to_string());
        assert_eq!(err.to_string(), "Authentication failed: invalid credentials");

        let err = Error::SendError {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to send result: status 502: bad gateway");

        let err = Error::DirectoryError {
            operation: "search".to_string(),
            message: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Directory operation `search` failed: connection reset"
        );
    }

    #[test]
    fn test_failure_scopes() {
        assert_eq!(
            Error::ConfigError("test".to_string()).scope(),
            FailureScope::Process
        );
        assert_eq!(
            Error::ConnectionError("test".to_string()).scope(),
            FailureScope::Process
        );
        assert_eq!(
            Error::FetchError("test".to_string()).scope(),
            FailureScope::Connection
        );
        assert_eq!(
            Error::DirectoryError {
                operation: "unbind".to_string(),
                message: "msg".to_string()
            }
            .scope(),
            FailureScope::Connection
        );
        assert_eq!(
            Error::AuthenticationError("test".to_string()).scope(),
            FailureScope::Request
        );
        assert_eq!(
            Error::NotFound("test".to_string()).scope(),
            FailureScope::Request
        );
        assert_eq!(
            Error::SendError {
                status: 404,
                body: String::new()
            }
            .scope(),
            FailureScope::Request
        );
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let bridge_err: Error = err.into();
        assert!(matches!(bridge_err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let bridge_err: Error = err.into();
        assert!(matches!(bridge_err, Error::ParseError(_)));
    }

    // Note: reqwest::Error conversion is difficult to exercise without real
    // HTTP traffic; it is covered by the gateway integration tests.

    #[test]
    fn test_error_clone_and_eq() {
        let err = Error::NotFound("jdoe".to_string());
        assert_eq!(err, err.clone());
        assert_ne!(err, Error::NotFound("other".to_string()));
    }
}
