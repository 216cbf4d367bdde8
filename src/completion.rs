//! Completion service abstraction and implementations.
//!
//! Defines the [`CompletionClient`] trait and concrete implementations:
//! - **[`DisabledClient`]**: fails every call; used when
//!   `completion.provider = "disabled"`.
//! - **[`OpenAiClient`]**: calls an OpenAI-compatible
//!   `POST {base_url}/chat/completions` endpoint. The default base URL points
//!   at Groq.
//!
//! # Provider Selection
//!
//! Use [`create_client`] to instantiate the client named in the
//! configuration:
//!
//! ```rust,no_run
//! # use repo_scribe::config::CompletionConfig;
//! # use repo_scribe::completion::{create_client, CompletionClient};
//! let mut config = CompletionConfig::default();
//! config.provider = "disabled".to_string();
//! let client = create_client(&config).unwrap();
//! assert_eq!(client.model_name(), "disabled");
//! ```
//!
//! # Failure Policy
//!
//! There is no retry. A transport error, a non-2xx status, or a reply
//! without `choices[0].message.content` is returned immediately as
//! [`ScribeError::Completion`].

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::error::{Result, ScribeError};
use crate::models::Message;

/// A remote text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the model identifier (e.g. `"llama-3.3-70b-versatile"`).
    fn model_name(&self) -> &str;

    /// Sends role-tagged messages and returns the generated text.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

// ============ Disabled Client ============

/// A client that refuses every call.
pub struct DisabledClient;

#[async_trait]
impl CompletionClient for DisabledClient {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        Err(ScribeError::Completion(
            "completion provider is disabled".to_string(),
        ))
    }
}

// ============ OpenAI-compatible Client ============

/// Client for OpenAI-compatible chat completion APIs (Groq, OpenAI, vLLM...).
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
}

impl OpenAiClient {
    /// Creates a client, reading the API key from the environment variable
    /// named by `completion.api_key_env`.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ScribeError::Config(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    /// Creates a client with an explicit API key.
    pub fn with_api_key(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScribeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_completion_tokens: config.max_completion_tokens,
            top_p: config.top_p,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_completion_tokens: self.max_completion_tokens,
            top_p: self.top_p,
            stream: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "completion request failed");
                ScribeError::Completion(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "completion service returned an error");
            return Err(ScribeError::Completion(format!(
                "API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScribeError::Completion(format!("invalid response body: {}", e)))?;
        parse_chat_response(&json)
    }
}

/// Extracts `choices[0].message.content` from a chat completion response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ScribeError::Completion("invalid response: missing choices[0].message.content".into())
        })
}

/// Create the [`CompletionClient`] named by `completion.provider`.
///
/// | Config Value | Client |
/// |-------------|--------|
/// | `"disabled"` | [`DisabledClient`] |
/// | `"openai"` | [`OpenAiClient`] |
pub fn create_client(config: &CompletionConfig) -> Result<Box<dyn CompletionClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledClient)),
        "openai" => Ok(Box::new(OpenAiClient::new(config)?)),
        other => Err(ScribeError::Config(format!(
            "Unknown completion provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chat_response() {
        let json = json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "FILE: a.py"}}]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "FILE: a.py");
    }

    #[test]
    fn test_parse_chat_response_missing_content() {
        let json = json!({"choices": []});
        assert!(matches!(
            parse_chat_response(&json),
            Err(ScribeError::Completion(_))
        ));
        let json = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert!(parse_chat_response(&json).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let body = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 1.0,
            max_completion_tokens: 8192,
            top_p: 1.0,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_completion_tokens"], 8192);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = CompletionConfig::default();
        config.base_url = "http://localhost:9999/v1/".to_string();
        let client = OpenAiClient::with_api_key(&config, "k").unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_disabled_client_fails() {
        let err = DisabledClient.complete(&[Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, ScribeError::Completion(_)));
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let mut config = CompletionConfig::default();
        config.provider = "mystery".to_string();
        assert!(create_client(&config).is_err());
    }

    #[test]
    fn test_create_client_missing_key() {
        let mut config = CompletionConfig::default();
        config.api_key_env = "REPO_SCRIBE_TEST_KEY_THAT_IS_NOT_SET".to_string();
        assert!(matches!(
            create_client(&config),
            Err(ScribeError::Config(_))
        ));
    }
}
