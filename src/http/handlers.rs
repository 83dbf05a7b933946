//! Request handlers for the HTTP surface.
//!
//! POST bodies carry an `action` field next to the action's own parameters.
//! Anything that can be routed answers `200`, including provider failures
//! (`success: false`) and unknown actions. Only bodies that cannot be decoded
//! answer `500 {"error": ...}`.

use std::fmt;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use crate::core::action::{ANALYZE_ACTION, Action, CHAT_ACTION};
use crate::core::catalog;
use crate::core::relay::{self, AnalysisKind, ChatArgs};
use crate::inference::{Completion, CompletionProvider, ProviderError};

pub const SERVICE_NAME: &str = "MCP ChatGPT Server";

/// Parameters of the `analyze` action. Unlike the stdio tool, any
/// `analysis_type` is accepted here, including `null` and non-strings, and
/// anything unrecognized falls back to the summary template. The raw value is
/// echoed back as `type`.
#[derive(Deserialize, Debug)]
struct AnalyzeRequest {
    text: String,
    #[serde(default = "default_analysis_type")]
    analysis_type: Value,
}

fn default_analysis_type() -> Value {
    Value::from(AnalysisKind::Summary.as_str())
}

impl AnalyzeRequest {
    fn kind(&self) -> AnalysisKind {
        self.analysis_type
            .as_str()
            .and_then(AnalysisKind::from_name)
            .unwrap_or_else(|| {
                debug!(
                    "unrecognized analysis_type {}, using summary",
                    self.analysis_type
                );
                AnalysisKind::Summary
            })
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// A POST body that could not be turned into a routed request.
#[derive(Debug)]
pub enum RequestError {
    Json(serde_json::Error),
    NotAnObject,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Json(e) => write!(f, "{e}"),
            RequestError::NotAnObject => write!(f, "request body must be a JSON object"),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Json(e)
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Decodes a POST body, runs the named action, and returns the `200` payload.
pub async fn route(provider: &dyn CompletionProvider, body: &[u8]) -> Result<Value, RequestError> {
    let request: Value = serde_json::from_slice(body)?;
    let action_name = match &request {
        Value::Object(fields) => fields
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default(),
        _ => return Err(RequestError::NotAnObject),
    };

    let action = Action::from_action_name(action_name);
    info!("POST action={:?}", action);

    match action {
        Action::Chat => {
            let args: ChatArgs = serde_json::from_value(request)?;
            let result = relay::chat(provider, &args).await;
            Ok(chat_body(result, &args.model))
        }
        Action::Analyze => {
            let params: AnalyzeRequest = serde_json::from_value(request)?;
            let result = relay::analyze(provider, params.kind(), &params.text).await;
            Ok(analyze_body(result, params.analysis_type))
        }
        Action::ListTools => Ok(json!({
            "success": true,
            "tools": catalog::catalog(),
        })),
        Action::Unknown(_) => Ok(json!({ "error": "Unknown action" })),
    }
}

fn failure_body(error: ProviderError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
    })
}

fn chat_body(result: Result<Completion, ProviderError>, model: &str) -> Value {
    match result {
        Ok(completion) => json!({
            "success": true,
            "response": completion.text,
            "model": model,
            "usage": completion.usage,
        }),
        Err(e) => failure_body(e),
    }
}

fn analyze_body(result: Result<Completion, ProviderError>, requested_type: Value) -> Value {
    match result {
        Ok(completion) => json!({
            "success": true,
            "analysis": completion.text,
            "type": requested_type,
            "usage": completion.usage,
        }),
        Err(e) => failure_body(e),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub(super) async fn dispatch(State(state): State<AppState>, body: Bytes) -> Response {
    match route(state.provider.as_ref(), &body).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(e) => {
            warn!("rejecting POST body: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub(super) async fn status() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": SERVICE_NAME,
        "endpoints": {
            "POST /api": "Main API endpoint",
            "actions": [CHAT_ACTION, ANALYZE_ACTION],
        },
    }))
}

pub(super) async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}
