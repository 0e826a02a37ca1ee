use crate::core::error::GemchatError;
use crate::credentials::CredentialStore;
use crate::providers::base_client::HttpClient;
use crate::providers::gemini::types::*;
use crate::providers::{GenerationProvider, ProviderError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// `generateContent` client. The API key is read from the shared store on
/// every call, so a key picked mid-session applies to the very next request.
#[derive(Clone)]
pub struct GeminiClient {
    client: HttpClient,
    credentials: CredentialStore,
}

impl GeminiClient {
    pub fn new(
        base_url: String,
        credentials: CredentialStore,
        timeout: Duration,
    ) -> Result<Self, GemchatError> {
        Ok(Self {
            client: HttpClient::new(base_url, timeout)?,
            credentials,
        })
    }

    fn endpoint(model: &str) -> String {
        format!("v1beta/models/{}:generateContent", model)
    }
}

/// Turn a non-2xx body into a provider error, keeping Google's message when present.
pub fn parse_error_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let status = envelope.error.code.unwrap_or(status);
            ProviderError::new(Some(status), envelope.error.message)
        }
        Err(_) => ProviderError::new(Some(status), body.trim()),
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<Option<String>, ProviderError> {
        let key = self.credentials.get().unwrap_or_default();
        let path = Self::endpoint(model);
        debug!(model, contents = request.contents.len(), "POST {}", path);

        let response = self.client.post(&path, &[("key", key.as_str())], request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::new(None, format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_error_message_is_extracted() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = parse_error_body(429, body);
        assert_eq!(err.status, Some(429));
        assert_eq!(err.message, "Resource has been exhausted (e.g. check quota).");
    }

    #[test]
    fn non_json_error_body_is_kept_as_is() {
        let err = parse_error_body(502, "  Bad Gateway\n");
        assert_eq!(err.status, Some(502));
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn endpoint_embeds_model() {
        assert_eq!(
            GeminiClient::endpoint("gemini-3-pro-preview"),
            "v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }
}
