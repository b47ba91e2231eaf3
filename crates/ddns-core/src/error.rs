//! Error types for the DDNS updater
//!
//! Every failure is terminal for the run. The top-level variants carry the
//! context of the operation that failed; the lower-level variants describe
//! the underlying cause reported by an `IpSource` or `DnsRegistrar`.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which mutating registrar call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    /// Updating an existing entry
    Update,
    /// Adding a new entry
    Create,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Update => f.write_str("update"),
            WriteOperation::Create => f.write_str("add new"),
        }
    }
}

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public IP lookup failed
    #[error("Failed to get public IPv4 address: {0}")]
    Resolution(String),

    /// Listing the domain's DNS entries failed
    #[error("Failed to get DNS entries for domain {domain}: {source}")]
    RegistrarRead {
        /// Domain whose entries were being listed
        domain: String,
        /// Underlying cause
        source: Box<Error>,
    },

    /// Updating or creating the A record failed
    #[error("Failed to {operation} A record for {subdomain}.{domain} to {ip}: {source}")]
    RegistrarWrite {
        /// Which write was attempted
        operation: WriteOperation,
        /// Target domain
        domain: String,
        /// Target record name
        subdomain: String,
        /// Address the record was being pointed at
        ip: String,
        /// Underlying cause
        source: Box<Error>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Wrap a listing failure with the domain it was for
    pub fn registrar_read(domain: impl Into<String>, source: Error) -> Self {
        Self::RegistrarRead {
            domain: domain.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a write failure with the record it was for
    pub fn registrar_write(
        operation: WriteOperation,
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        ip: impl Into<String>,
        source: Error,
    ) -> Self {
        Self::RegistrarWrite {
            operation,
            domain: domain.into(),
            subdomain: subdomain.into(),
            ip: ip.into(),
            source: Box::new(source),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
