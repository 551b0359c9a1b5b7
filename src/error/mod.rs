//! Error types for store-intel.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all store-intel operations.
#[derive(Error, Debug)]
pub enum StoreIntelError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Query failed with status {status}: {message}")]
    QueryFailed { status: String, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unexpected response: {0}")]
    Protocol(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreIntelError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::Protocol(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::QueryFailed { .. } => ErrorCategory::QueryFailed,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::InvalidArgument(_) => ErrorCategory::InvalidArgument,
        }
    }

    /// Whether this error came from the network/HTTP layer talking to a
    /// remote service (as opposed to a timeout, cancellation or local fault).
    pub fn is_transport(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network
                | ErrorCategory::Server
                | ErrorCategory::Api
                | ErrorCategory::Authentication
                | ErrorCategory::RateLimit
                | ErrorCategory::Serialization
        )
    }

    /// Whether this error is potentially retryable by a caller.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit
            | ErrorCategory::Network
            | ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::QueryFailed | ErrorCategory::InvalidArgument => {
                RecoverySuggestion::RephraseQuestion
            }
            _ => RecoverySuggestion::ContactSupport,
        }
    }

    /// Short explanation suitable for showing to an end user or feeding
    /// back to the model as a tool result.
    pub fn user_message(&self) -> &'static str {
        self.category().user_message()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StoreIntelError>;
