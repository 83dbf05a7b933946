//! # Tool Executor
//!
//! The stdio surface exposes the two relays as named tools. Each tool's
//! input schema is generated from its argument struct, and calls are
//! dispatched by name in `execute()`.
//!
//! Provider faults come back as ordinary text so the calling model can read
//! them. Arguments that cannot be decoded for `analyze_text` are reported as
//! an error result instead.

use log::{debug, warn};
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::action::{ANALYZE_TOOL, Action, CHAT_TOOL};
use crate::core::relay::{self, AnalysisKind, ChatArgs};
use crate::inference::CompletionProvider;

/// A tool advertised to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value, // JSON Schema
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct AnalyzeArgs {
    /// The text to analyze
    pub text: String,
    /// Type of analysis to perform
    pub analysis_type: AnalysisKind,
}

/// Text returned from a tool call. Faults are reported inline as text, never
/// as a protocol-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Renders `T` as a flat JSON schema object, nested types inlined.
fn input_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(root.schema)
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("title");
    }
    schema
}

/// Returns the list of tool definitions available to the client.
pub fn available() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: CHAT_TOOL.into(),
            description: "Send a message to ChatGPT and get a response. Use this for general conversations, questions, analysis, or any task requiring AI assistance.".into(),
            input_schema: input_schema::<ChatArgs>(),
        },
        ToolDefinition {
            name: ANALYZE_TOOL.into(),
            description: "Analyze text for sentiment, themes, or specific patterns using ChatGPT".into(),
            input_schema: input_schema::<AnalyzeArgs>(),
        },
    ]
}

/// Executes a tool call and returns its text output.
pub async fn execute(provider: &dyn CompletionProvider, name: &str, arguments: Value) -> ToolOutput {
    debug!("tool call: {name}");
    match Action::from_tool_name(name) {
        Action::Chat => {
            let args = match serde_json::from_value::<ChatArgs>(arguments) {
                Ok(args) => args,
                Err(e) => return ToolOutput::text(format!("Error calling ChatGPT: {e}")),
            };
            match relay::chat(provider, &args).await {
                Ok(completion) => ToolOutput::text(completion.text),
                Err(e) => ToolOutput::text(format!("Error calling ChatGPT: {e}")),
            }
        }
        Action::Analyze => {
            let args = match serde_json::from_value::<AnalyzeArgs>(arguments) {
                Ok(args) => args,
                Err(e) => {
                    warn!("rejecting {ANALYZE_TOOL} arguments: {e}");
                    return ToolOutput::text(format!("Error analyzing text: {e}"));
                }
            };
            match relay::analyze(provider, args.analysis_type, &args.text).await {
                Ok(completion) => ToolOutput::text(completion.text),
                Err(e) => ToolOutput::text(format!("Error analyzing text: {e}")),
            }
        }
        Action::ListTools | Action::Unknown(_) => ToolOutput::text(format!("Unknown tool: {name}")),
    }
}
