use crate::config::{Config, GenerationParams};
use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Sends one prompt to a completion backend and returns the reply text.
///
/// `Ok(None)` means the backend answered but carried no content in its first
/// choice. The session decides what to show in that case.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError>;
}

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
pub struct LlmRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<LlmMessage<'a>>,
    pub max_tokens: u32,
    pub top_p: f64,
    pub temperature: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub stop: &'a [String],
}

/// Message in the request
#[derive(Debug, Serialize)]
pub struct LlmMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> LlmRequest<'a> {
    /// A context-free request: the prompt is the only message.
    pub fn new(prompt: &'a str, params: &'a GenerationParams) -> Self {
        Self {
            model: &params.model,
            messages: vec![LlmMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            temperature: params.temperature,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            stop: &params.stop,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LlmResponse {
    #[serde(default)]
    choices: Vec<LlmChoice>,
}

#[derive(Debug, Deserialize)]
struct LlmChoice {
    #[serde(default)]
    message: Option<LlmResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct LlmResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl LlmResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// HTTP client for the OpenAI chat completions API
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    params: GenerationParams,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            params: config.generation.clone(),
        })
    }

    /// Pull a readable message out of a non-success body
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if body.trim().is_empty() => "empty response body".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        let request = LlmRequest::new(prompt, &self.params);
        debug!(model = %self.params.model, chars = prompt.chars().count(), "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "completion endpoint returned an error status");
            return Err(CompletionError::status(status.as_u16(), Self::error_message(&body)));
        }

        let parsed: LlmResponse = serde_json::from_str(&body)?;
        let content = parsed.into_content();
        debug!(has_content = content.is_some(), "completion response received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_body_carries_prompt_and_params() {
        let params = GenerationParams::default();
        let request = LlmRequest::new("Hello", &params);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 1024,
                "top_p": 1.0,
                "temperature": 1.0,
                "frequency_penalty": 0.5,
                "presence_penalty": 0.5,
                "stop": ["문장 생성 중단 단어"],
            })
        );
    }

    #[test]
    fn request_uses_overridden_params() {
        let params = GenerationParams {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 64,
            stop: Vec::new(),
            ..GenerationParams::default()
        };
        let value = serde_json::to_value(LlmRequest::new("hi", &params)).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["max_tokens"], 64);
        assert_eq!(value["stop"], json!([]));
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let response: LlmResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "Hi there"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(response.into_content().as_deref(), Some("Hi there"));
    }

    #[test]
    fn missing_choices_or_content_yield_none() {
        for body in [
            json!({"choices": []}),
            json!({}),
            json!({"choices": [{}]}),
            json!({"choices": [{"message": {"content": null}}]}),
        ] {
            let response: LlmResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.into_content(), None);
        }
    }

    #[test]
    fn error_message_prefers_api_error_field() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(LlmClient::error_message(body), "Incorrect API key provided");
        assert_eq!(LlmClient::error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(LlmClient::error_message(""), "empty response body");
    }
}
