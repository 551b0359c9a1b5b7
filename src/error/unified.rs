//! Error classification and recovery.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    QueryFailed,
    Cancelled,
    InvalidArgument,
}

impl ErrorCategory {
    /// User-facing wording for the category.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Timeout => "The query is taking too long to answer. Please try again or narrow the question.",
            Self::Cancelled => "The request was cancelled before it finished.",
            Self::QueryFailed => "The data service could not answer this question.",
            Self::InvalidArgument => "The request was missing required information.",
            Self::Authentication => "The data service rejected our credentials.",
            Self::RateLimit => "The data service is busy right now. Please try again shortly.",
            Self::Configuration => "The assistant is not configured correctly.",
            Self::Network | Self::Server | Self::Api | Self::Serialization => {
                "The data service is unavailable right now."
            }
        }
    }
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    RephraseQuestion,
    ContactSupport,
}
