// src/error.rs

//! Unified error handling for the search and enrichment tools.

use std::fmt;

use thiserror::Error;

/// Result type alias for dev-scan operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Upstream asked us to slow down (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// GraphQL endpoint reported errors in its response body
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Browser automation tool failed
    #[error("Browser session {session}: {message}")]
    Browser { session: String, message: String },

    /// A single call exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a browser session error.
    pub fn browser(session: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Browser {
            session: session.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error describing what was being waited on.
    pub fn timeout(context: impl fmt::Display) -> Self {
        Self::Timeout(context.to_string())
    }

    /// Whether this error is an upstream rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_distinguished() {
        assert!(AppError::RateLimited("reddit".into()).is_rate_limited());
        assert!(!AppError::timeout("eval").is_rate_limited());
        assert!(
            !AppError::Status {
                status: 500,
                url: "https://example.com".into()
            }
            .is_rate_limited()
        );
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::browser("enrich-0", "exit status 1");
        assert_eq!(err.to_string(), "Browser session enrich-0: exit status 1");
        let err = AppError::Status {
            status: 503,
            url: "https://hn.algolia.com".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from https://hn.algolia.com");
    }
}
