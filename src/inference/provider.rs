use std::fmt;

use async_trait::async_trait;

use super::types::{Completion, Message};

/// Errors that can occur during provider operations.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response.
    Parse(String),
    /// Any other fault raised by a provider. Displays as the bare message.
    Other(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_output_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Runs a single non-streaming completion and returns the first choice.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = ProviderError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 429): rate limited");
    }

    #[test]
    fn test_config_error_display() {
        let err = ProviderError::Config("OPENAI_API_KEY is not set".to_string());
        assert_eq!(err.to_string(), "config error: OPENAI_API_KEY is not set");
    }

    #[test]
    fn test_other_error_display_is_bare_message() {
        let err = ProviderError::Other("model overloaded".to_string());
        assert_eq!(err.to_string(), "model overloaded");
    }
}
