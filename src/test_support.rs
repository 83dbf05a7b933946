//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::inference::{
    Completion, CompletionProvider, CompletionRequest, Message, ProviderError, Usage,
};

/// An owned copy of what a relay asked the provider for.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_output_tokens: u32,
}

/// A provider that records each request and answers with a canned outcome.
pub struct StubProvider {
    reply: Result<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `ProviderError::Other(message)`.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: request.model.to_string(),
            messages: request.messages.to_vec(),
            max_output_tokens: request.max_output_tokens,
        });

        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: Usage {
                    prompt_tokens: 12,
                    completion_tokens: 8,
                    total_tokens: 20,
                },
            }),
            Err(message) => Err(ProviderError::Other(message.clone())),
        }
    }
}
