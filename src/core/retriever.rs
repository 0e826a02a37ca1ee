//! Reply retrieval: dispatches an assembled request and drives the bounded
//! retry/recovery policy until it reaches a single terminal outcome.
//!
//! Failures are classified per attempt:
//! - entity-not-found / 404 re-opens the host credential selector and retries
//!   with the same payload, assuming the user picked a working key;
//! - 429 and 5xx back off exponentially (`initial_delay * 2^attempt`) and retry;
//! - an empty reply and every other error end the call immediately.

use crate::core::assembler::{GenerationSettings, assemble};
use crate::core::error::{FailureKind, ReplyError};
use crate::core::turn::{InlineImage, Turn};
use crate::credentials::CredentialHost;
use crate::providers::gemini::types::GenerateContentRequest;
use crate::providers::{GenerationProvider, ProviderError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Ask the credential host whether a key is actually selected before
    /// retrying, instead of trusting the selector blindly.
    pub recheck_credential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(1000),
            recheck_credential: false,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

pub fn classify(error: &ProviderError) -> FailureKind {
    match error.status {
        _ if error.message.contains(ENTITY_NOT_FOUND) => FailureKind::CredentialMissing,
        Some(404) => FailureKind::CredentialMissing,
        Some(429) => FailureKind::RateLimited,
        Some(500..=599) => FailureKind::ServerTransient,
        _ => FailureKind::Fatal,
    }
}

pub struct Retriever {
    provider: Arc<dyn GenerationProvider>,
    credentials: Option<Arc<dyn CredentialHost>>,
    model: String,
    settings: GenerationSettings,
    policy: RetryPolicy,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        credentials: Option<Arc<dyn CredentialHost>>,
        model: String,
        settings: GenerationSettings,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            credentials,
            model,
            settings,
            policy,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    /// Assemble `history` and run it to a terminal outcome.
    pub async fn resolve_reply(
        &self,
        history: &[Turn],
        location: &str,
        image: Option<&InlineImage>,
        cancel: &CancellationToken,
    ) -> Result<String, ReplyError> {
        let request = assemble(history, location, image, &self.model, self.settings);
        self.execute(&request, cancel).await
    }

    pub async fn execute(
        &self,
        request: &GenerateContentRequest,
        cancel: &CancellationToken,
    ) -> Result<String, ReplyError> {
        let mut attempt = 0;
        loop {
            debug!(attempt = attempt + 1, model = %self.model, "dispatching request");
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ReplyError::cancelled()),
                outcome = self.provider.generate_content(&self.model, request) => outcome,
            };

            let error = match outcome {
                Ok(Some(text)) if !text.is_empty() => return Ok(text),
                Ok(_) => {
                    warn!(attempt = attempt + 1, "Gemini API returned an empty response");
                    return Err(ReplyError::empty_response());
                }
                Err(error) => error,
            };

            let kind = classify(&error);
            warn!(attempt = attempt + 1, %kind, error = %error, "Gemini API error");
            self.recover(kind, &error, attempt, cancel).await?;
            attempt += 1;
        }
    }

    /// `Ok` means dispatch again; `Err` is the terminal failure.
    async fn recover(
        &self,
        kind: FailureKind,
        error: &ProviderError,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> Result<(), ReplyError> {
        let can_retry = attempt < self.policy.max_retries;

        match kind {
            FailureKind::CredentialMissing => {
                let Some(host) = &self.credentials else {
                    return Err(ReplyError::credential_missing());
                };

                // The selector runs to completion so no prompt outlives the call.
                info!(attempt = attempt + 1, "opening credential selector");
                let selected = host.open_credential_selector().await;
                if cancel.is_cancelled() {
                    return Err(ReplyError::cancelled());
                }
                if let Err(e) = selected {
                    warn!(error = %e, "credential selector failed");
                    return Err(ReplyError::credential_missing());
                }

                if !can_retry {
                    return Err(ReplyError::credential_missing());
                }
                if self.policy.recheck_credential && !host.has_selected_credential().await {
                    return Err(ReplyError::credential_missing());
                }
                Ok(())
            }
            kind if kind.is_transient() && can_retry => {
                let delay = self.policy.backoff(attempt);
                debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ReplyError::cancelled()),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
            FailureKind::RateLimited => Err(ReplyError::rate_limited()),
            _ => Err(ReplyError::from_provider(kind, &error.message)),
        }
    }
}
