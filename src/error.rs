//! Error types for the Command Clinic telemetry core
//!
//! This module provides structured error handling using thiserror. Alias
//! validation failures and external-call failures are always surfaced to the
//! caller; local corruption (bad log lines, bad alias documents, malformed
//! model output) is recovered with safe defaults at the call site and never
//! reaches this taxonomy.

use thiserror::Error;

/// Main error type for Command Clinic operations
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Alias store is full (bounded at 20 entries)
    #[error("Alias limit reached ({0} aliases); remove one before adding another")]
    CapacityExceeded(usize),

    /// Alias id or (owner, extension, command) triple already present
    #[error("Duplicate alias: {0}")]
    DuplicateAlias(String),

    /// Attempt to change a field that is fixed once created
    #[error("Field '{0}' cannot be changed after creation")]
    ImmutableField(&'static str),

    /// No alias with the given id
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// No API key configured
    #[error(
        "Anthropic API key not configured. Set ANTHROPIC_API_KEY (or CLINIC_API_KEY) \
         in the environment, or add `api_key` to the config file. Keys are issued at \
         https://console.anthropic.com"
    )]
    MissingCredential,

    /// HTTP 401 from the analysis service
    #[error("API key rejected (401): {0}. Verify the key is current, has no stray whitespace, and is entered exactly as issued")]
    Auth(String),

    /// HTTP 429 from the analysis service
    #[error("Rate limited by the analysis service (429): {0}. Wait about a minute before retrying")]
    RateLimited(String),

    /// HTTP 5xx from the analysis service
    #[error("Analysis service temporarily unavailable ({status}): {message}. Retry later")]
    ServiceUnavailable { status: u16, message: String },

    /// The bounded external call exceeded its deadline
    #[error("Analysis request timed out after {0}s")]
    Timeout(u64),

    /// Any other non-2xx status from the analysis service
    #[error("Unexpected analysis service error ({status}): {message}")]
    UnknownApi { status: u16, message: String },

    /// HTTP transport error (connection, TLS, protocol)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Command Clinic operations
pub type Result<T> = std::result::Result<T, ClinicError>;

impl ClinicError {
    /// True for the alias validation family, which always surfaces to the
    /// caller synchronously and is never absorbed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClinicError::CapacityExceeded(_)
                | ClinicError::DuplicateAlias(_)
                | ClinicError::ImmutableField(_)
                | ClinicError::AliasNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClinicError::AliasNotFound("file-search".to_string());
        assert_eq!(err.to_string(), "Alias not found: file-search");
    }

    #[test]
    fn test_validation_family() {
        assert!(ClinicError::CapacityExceeded(20).is_validation());
        assert!(ClinicError::ImmutableField("id").is_validation());
        assert!(!ClinicError::Timeout(30).is_validation());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ClinicError = io.into();
        assert!(matches!(err, ClinicError::Io(_)));
    }
}
