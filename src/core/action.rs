//! # Actions
//!
//! Every inbound request names an operation. The HTTP surface calls it an
//! *action* (`"chat"`), the stdio surface calls it a *tool*
//! (`"chat_with_gpt"`). Both resolve to the same closed `Action` enum so that
//! adapters dispatch with an exhaustive `match`.
//!
//! ```text
//! "chat"       | "chat_with_gpt"  →  Action::Chat
//! "analyze"    | "analyze_text"   →  Action::Analyze
//! "list_tools" (HTTP only)        →  Action::ListTools
//! anything else                   →  Action::Unknown(name)
//! ```

pub const CHAT_ACTION: &str = "chat";
pub const ANALYZE_ACTION: &str = "analyze";
pub const LIST_TOOLS_ACTION: &str = "list_tools";

pub const CHAT_TOOL: &str = "chat_with_gpt";
pub const ANALYZE_TOOL: &str = "analyze_text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Chat,
    Analyze,
    ListTools,
    Unknown(String),
}

impl Action {
    /// Resolves an HTTP `action` field.
    pub fn from_action_name(name: &str) -> Action {
        match name {
            CHAT_ACTION => Action::Chat,
            ANALYZE_ACTION => Action::Analyze,
            LIST_TOOLS_ACTION => Action::ListTools,
            other => Action::Unknown(other.to_string()),
        }
    }

    /// Resolves a stdio tool name. Listing is a protocol method there, not a tool.
    pub fn from_tool_name(name: &str) -> Action {
        match name {
            CHAT_TOOL => Action::Chat,
            ANALYZE_TOOL => Action::Analyze,
            other => Action::Unknown(other.to_string()),
        }
    }
}
