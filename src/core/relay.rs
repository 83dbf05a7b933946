//! # Relays
//!
//! The two operations both surfaces expose. Each relay builds a short
//! conversation, makes exactly one provider call, and hands back either the
//! completion or the provider's error. Rendering that outcome is the
//! transport adapter's job.

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::inference::{Completion, CompletionProvider, CompletionRequest, Message, ProviderError};

/// Output cap sent with every completion request.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
/// Models advertised to callers. Not enforced: any model string is forwarded.
pub const SUPPORTED_MODELS: [&str; 3] = ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"];

// ============================================================================
// Analysis kinds
// ============================================================================

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Sentiment,
    Themes,
    Summary,
    KeyPoints,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Sentiment,
        AnalysisKind::Themes,
        AnalysisKind::Summary,
        AnalysisKind::KeyPoints,
    ];

    /// Looks up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<AnalysisKind> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Themes => "themes",
            AnalysisKind::Summary => "summary",
            AnalysisKind::KeyPoints => "key_points",
        }
    }

    /// The canned instruction placed in front of the analyzed text.
    pub fn instruction(self) -> &'static str {
        match self {
            AnalysisKind::Sentiment => {
                "Analyze the sentiment of this text and provide a detailed assessment:"
            }
            AnalysisKind::Themes => "Identify and explain the main themes in this text:",
            AnalysisKind::Summary => "Provide a concise summary of this text:",
            AnalysisKind::KeyPoints => "Extract the key points from this text as a bulleted list:",
        }
    }

    /// Builds the full user prompt: instruction, blank line, text verbatim.
    pub fn prompt(self, text: &str) -> String {
        format!("{}\n\n{}", self.instruction(), text)
    }
}

// ============================================================================
// Chat
// ============================================================================

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn model_schema(_: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
    use schemars::schema::{InstanceType, SchemaObject};

    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        enum_values: Some(SUPPORTED_MODELS.iter().map(|m| (*m).into()).collect()),
        ..Default::default()
    };
    schema.metadata().default = Some(DEFAULT_MODEL.into());
    schema.into()
}

/// Arguments of a chat relay call. Shared by both surfaces.
#[derive(Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    /// The message or prompt to send to ChatGPT
    pub message: String,
    /// Optional system prompt to guide ChatGPT's behavior
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// GPT model to use
    #[serde(default = "default_model")]
    #[schemars(schema_with = "model_schema")]
    pub model: String,
}

impl ChatArgs {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            system_prompt: default_system_prompt(),
            model: default_model(),
        }
    }
}

/// Forwards a system + user conversation to the provider.
pub async fn chat(
    provider: &dyn CompletionProvider,
    args: &ChatArgs,
) -> Result<Completion, ProviderError> {
    let messages = [
        Message::system(args.system_prompt.as_str()),
        Message::user(args.message.as_str()),
    ];
    debug!(
        "chat relay: provider={}, model={}, message_len={}",
        provider.name(),
        args.model,
        args.message.len()
    );

    let result = provider
        .complete(CompletionRequest {
            model: &args.model,
            messages: &messages,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
        .await;

    match &result {
        Ok(completion) => info!("chat relay ok: total_tokens={}", completion.usage.total_tokens),
        Err(e) => warn!("chat relay failed: {e}"),
    }
    result
}

// ============================================================================
// Analysis
// ============================================================================

/// Sends the templated analysis prompt as a single user message.
pub async fn analyze(
    provider: &dyn CompletionProvider,
    kind: AnalysisKind,
    text: &str,
) -> Result<Completion, ProviderError> {
    let messages = [Message::user(kind.prompt(text))];
    debug!(
        "analysis relay: provider={}, kind={}, text_len={}",
        provider.name(),
        kind.as_str(),
        text.len()
    );

    let result = provider
        .complete(CompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
        .await;

    match &result {
        Ok(completion) => info!(
            "analysis relay ok: kind={}, total_tokens={}",
            kind.as_str(),
            completion.usage.total_tokens
        ),
        Err(e) => warn!("analysis relay failed: {e}"),
    }
    result
}
