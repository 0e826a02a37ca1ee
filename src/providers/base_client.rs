use crate::core::error::GemchatError;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;

/// Thin JSON-over-HTTP client shared by provider implementations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GemchatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Content-Type", "application/json")
    }

    /// POST `payload` as JSON. Non-2xx statuses are returned, not raised.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        payload: &T,
    ) -> Result<Response, reqwest::Error> {
        self.request(path).query(query).json(payload).send().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let client = HttpClient::new(
            "https://generativelanguage.googleapis.com/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.url("/v1beta/models/gemini:generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini:generateContent"
        );
    }
}
