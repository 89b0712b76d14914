//! Error types for reqkit
//!
//! This module defines the error hierarchy used inside the crate.
//! The request executor never hands these to its caller directly: they are
//! folded into a [`RequestResult`](crate::http::RequestResult) by
//! [`Outcome::collapse`](crate::http::Outcome::collapse).

use thiserror::Error;

/// The main error type for reqkit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("XML body must start with an XML declaration (<?xml ...?>)")]
    InvalidXmlBody,

    // ============================================================================
    // Encoding Errors
    // ============================================================================
    #[error("Failed to encode request body: {message}")]
    Encoding { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Transport error: {message}")]
    Transport { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether the error was raised while validating caller input
    /// (before anything was sent).
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidUrl { .. } | Error::InvalidXmlBody)
    }
}

/// Result type alias for reqkit
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_url("not-a-url", "relative URL without a base");
        assert_eq!(
            err.to_string(),
            "Invalid URL 'not-a-url': relative URL without a base"
        );

        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::invalid_url("x", "y").is_validation());
        assert!(Error::InvalidXmlBody.is_validation());

        assert!(!Error::transport("boom").is_validation());
        assert!(!Error::encoding("bad").is_validation());
        assert!(!Error::config("test").is_validation());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }

    #[test]
    fn test_io_error_context() {
        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = io.with_context(|| "reading config".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "reading config: IO error: missing");
    }
}
