use crate::providers::gemini::types::GenerateContentRequest;
use async_trait::async_trait;
use std::fmt;

pub mod base_client;
pub mod gemini;

/// Failure reported by a generation backend, before any retry classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// HTTP status, absent for transport-level failures.
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::new(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

/// One-shot content generation against a remote model.
///
/// `Ok(None)` means the call succeeded but produced no text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<Option<String>, ProviderError>;
}
