//! OpenAI provider implementation using the Chat Completions API.
//!
//! One non-streaming `POST /chat/completions` per call. Only the first
//! choice and the usage block of the response are read.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{
    Completion, CompletionProvider, CompletionRequest, Message, ProviderError, Usage,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// The request body for the Chat Completions API
#[derive(Serialize, Debug)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    // null when the model refuses or only calls tools
    content: Option<String>,
}

/// Pulls the first choice out of a decoded response.
fn first_completion(response: ChatCompletionsResponse) -> Result<Completion, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))?;

    Ok(Completion {
        text: choice.message.content.unwrap_or_default(),
        usage: response.usage,
    })
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenAI API provider using Chat Completions
pub struct OpenAiProvider {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenAI API key. `None` is accepted here; every call then
    ///   fails with `ProviderError::Config`.
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Sends a request to the Chat Completions endpoint and returns the response.
    async fn send_request(
        &self,
        api_key: &str,
        request: &ChatCompletionsRequest<'_>,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("OpenAI response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenAI API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let body = ChatCompletionsRequest {
            model: request.model,
            messages: request.messages,
            max_tokens: request.max_output_tokens,
        };

        info!(
            "OpenAI Chat Completions request: model={}, message_count={}, max_tokens={}",
            request.model,
            request.messages.len(),
            request.max_output_tokens
        );

        let response = self.send_request(api_key, &body).await?;
        let decoded: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let completion = first_completion(decoded)?;
        info!(
            "OpenAI completion: {} chars, usage={:?}",
            completion.text.len(),
            completion.usage
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_max_tokens() {
        let messages = [Message::system("be brief"), Message::user("hello")];
        let body = ChatCompletionsRequest {
            model: "gpt-4o",
            messages: &messages,
            max_tokens: 1000,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_first_completion_takes_first_choice() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }"#;
        let decoded: ChatCompletionsResponse = serde_json::from_str(raw).unwrap();
        let completion = first_completion(decoded).unwrap();

        assert_eq!(completion.text, "first");
        assert_eq!(completion.usage.total_tokens, 7);
    }

    #[test]
    fn test_first_completion_null_content_is_empty() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let decoded: ChatCompletionsResponse = serde_json::from_str(raw).unwrap();
        let completion = first_completion(decoded).unwrap();

        assert_eq!(completion.text, "");
        assert_eq!(completion.usage, Usage::default());
    }

    #[test]
    fn test_first_completion_without_choices_is_parse_error() {
        let decoded: ChatCompletionsResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            first_completion(decoded),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiProvider::new(None, Some("http://localhost:9999/v1/".to_string()));
        assert_eq!(provider.base_url, "http://localhost:9999/v1");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_at_call_time() {
        let provider = OpenAiProvider::new(None, Some("http://127.0.0.1:9".to_string()));
        let messages = [Message::user("hello")];
        let result = provider
            .complete(CompletionRequest {
                model: "gpt-4o",
                messages: &messages,
                max_output_tokens: 1000,
            })
            .await;

        assert!(matches!(result, Err(ProviderError::Config(_))));
    }
}
