//! Gemini `generateContent` client with bounded retry on overload.

use crate::config::Config;
use crate::error::SourceError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Trait for text generation - enables mocking for tests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes a prompt, returning the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, SourceError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Google Gemini client.
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_retries: u32,
    retry_base_ms: u64,
}

impl GeminiClient {
    /// Creates a new Gemini client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: base_url.unwrap_or_else(|| config.gemini_base_url.clone()),
            max_retries: config.llm_max_retries,
            retry_base_ms: config.llm_retry_base_ms,
        })
    }

    /// Delay before retry number `attempt` (0-based): base * 2^attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_ms.saturating_mul(2u64.saturating_pow(attempt)))
    }

    async fn generate_once(&self, prompt: &str, api_key: &str) -> Result<String, SourceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 2048
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        debug!("Gemini response status: {}", status);

        if status == 429 || status == 503 {
            return Err(SourceError::RateLimited(status.as_u16()));
        }

        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&text)?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .filter(|t| !t.trim().is_empty())
            .ok_or(SourceError::Empty)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, SourceError> {
        let api_key =
            self.api_key.as_deref().ok_or(SourceError::MissingCredentials("GEMINI_API_KEY"))?;

        info!("Calling Gemini ({})", self.model);

        let mut attempt = 0;
        loop {
            match self.generate_once(prompt, api_key).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!("Gemini overloaded ({}), retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OK_BODY: &str =
        r#"{"candidates": [{"content": {"parts": [{"text": "Harika bir kitap."}], "role": "model"}}]}"#;

    fn make_test_config() -> Config {
        Config {
            gemini_api_key: Some("gem-key".to_string()),
            llm_max_retries: 3,
            llm_retry_base_ms: 1,
            ..Config::default()
        }
    }

    fn generate_path() -> &'static str {
        "/v1beta/models/gemini-1.5-flash:generateContent"
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(query_param("key", "gem-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            GeminiClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();
        let text = client.complete("Bir analiz yaz").await.unwrap();
        assert_eq!(text, "Harika bir kitap.");
    }

    #[tokio::test]
    async fn test_retries_on_503_then_succeeds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            GeminiClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();
        let text = client.complete("prompt").await.unwrap();
        assert_eq!(text, "Harika bir kitap.");
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(429))
            .expect(4)
            .mount(&mock_server)
            .await;

        let client =
            GeminiClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, SourceError::RateLimited(429)));
    }

    #[tokio::test]
    async fn test_no_retry_on_400() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            GeminiClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, SourceError::Status(400)));
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"candidates": []}"#))
            .mount(&mock_server)
            .await;

        let client =
            GeminiClient::with_base_url(&make_test_config(), Some(mock_server.uri())).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, SourceError::Empty));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let config = Config::default();
        let client =
            GeminiClient::with_base_url(&config, Some("http://localhost:1".into())).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, SourceError::MissingCredentials("GEMINI_API_KEY")));
    }

    #[tokio::test]
    async fn test_backoff_doubles() {
        let config = Config {
            llm_retry_base_ms: 1000,
            ..make_test_config()
        };
        let client = GeminiClient::with_base_url(&config, Some("http://localhost".into())).unwrap();
        assert_eq!(client.backoff(0), Duration::from_millis(1000));
        assert_eq!(client.backoff(1), Duration::from_millis(2000));
        assert_eq!(client.backoff(2), Duration::from_millis(4000));
        assert_eq!(client.backoff(80), Duration::from_millis(u64::MAX));
    }
}
