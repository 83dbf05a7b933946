//! Static description of the HTTP actions, returned by `list_tools`.

use serde::Serialize;

use crate::core::action::{ANALYZE_ACTION, CHAT_ACTION};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
}

pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            name: CHAT_ACTION,
            description: "Chat with ChatGPT",
            parameters: &[
                "message",
                "system_prompt (optional)",
                "model (optional: gpt-4o, gpt-4o-mini, gpt-4-turbo)",
            ],
        },
        CatalogEntry {
            name: ANALYZE_ACTION,
            description: "Analyze text",
            parameters: &["text", "analysis_type (sentiment|themes|summary|key_points)"],
        },
    ]
}
