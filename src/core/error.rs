use std::fmt;
use std::io;
use thiserror::Error;

/// Unified error type for the gemchat application
#[derive(Error, Debug)]
pub enum GemchatError {
    /// API-related errors outside the reply retry loop
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Credential selection errors
    #[error("Credential error: {0}")]
    Credential(String),

    /// Terminal outcome of a failed reply
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

impl From<reqwest::Error> for GemchatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GemchatError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            GemchatError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            GemchatError::Api(format!("API returned error status: {}", err))
        } else {
            GemchatError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for GemchatError {
    fn from(err: serde_json::Error) -> Self {
        GemchatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for GemchatError {
    fn from(err: serde_yml::Error) -> Self {
        GemchatError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<rustyline::error::ReadlineError> for GemchatError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        GemchatError::Input(format!("Line editor error: {}", err))
    }
}

/// How a failed generation attempt is handled by the retriever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Entity not found / 404: the selected key or project is unusable.
    CredentialMissing,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerTransient,
    /// The call succeeded but carried no text.
    EmptyResponse,
    /// Anything else; never retried.
    Fatal,
    /// The caller tore the request down.
    Cancelled,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::ServerTransient)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::CredentialMissing => "credential-missing",
            FailureKind::RateLimited => "rate-limited",
            FailureKind::ServerTransient => "server-transient",
            FailureKind::EmptyResponse => "empty-response",
            FailureKind::Fatal => "fatal",
            FailureKind::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// The single user-facing failure that leaves [`crate::core::retriever::Retriever`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ReplyError {
    pub kind: FailureKind,
    pub message: String,
}

pub const CREDENTIAL_MISSING_MESSAGE: &str =
    "API Key or Project not found. Please select a valid paid project API key.";
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Try again in a few seconds.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "Model returned an empty response.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred with the Gemini API.";
pub const CANCELLED_MESSAGE: &str = "Request cancelled.";

impl ReplyError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn credential_missing() -> Self {
        Self::new(FailureKind::CredentialMissing, CREDENTIAL_MISSING_MESSAGE)
    }

    pub fn rate_limited() -> Self {
        Self::new(FailureKind::RateLimited, RATE_LIMITED_MESSAGE)
    }

    pub fn empty_response() -> Self {
        Self::new(FailureKind::EmptyResponse, EMPTY_RESPONSE_MESSAGE)
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, CANCELLED_MESSAGE)
    }

    /// Surface the provider's own message, or the generic fallback when it has none.
    pub fn from_provider(kind: FailureKind, provider_message: &str) -> Self {
        let message = if provider_message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            provider_message.to_string()
        };
        Self::new(kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_message_is_kept_verbatim() {
        let err = ReplyError::from_provider(FailureKind::Fatal, "Invalid JSON payload received.");
        assert_eq!(err.to_string(), "Invalid JSON payload received.");
    }

    #[test]
    fn blank_provider_message_falls_back() {
        let err = ReplyError::from_provider(FailureKind::ServerTransient, "  ");
        assert_eq!(err.message, GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.kind, FailureKind::ServerTransient);
    }

    #[test]
    fn only_rate_limit_and_server_errors_are_transient() {
        assert!(FailureKind::RateLimited.is_transient());
        assert!(FailureKind::ServerTransient.is_transient());
        assert!(!FailureKind::CredentialMissing.is_transient());
        assert!(!FailureKind::EmptyResponse.is_transient());
        assert!(!FailureKind::Fatal.is_transient());
    }

    #[test]
    fn reply_error_converts_into_app_error() {
        let err: GemchatError = ReplyError::rate_limited().into();
        assert_eq!(err.to_string(), RATE_LIMITED_MESSAGE);
    }
}
