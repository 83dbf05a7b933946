//! # Stdio Adapter (Model Context Protocol)
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout. Supports the subset of MCP
//! a tool-only server needs:
//!
//! - `initialize` / `notifications/initialized`
//! - `ping`
//! - `tools/list`
//! - `tools/call`
//!
//! Requests are handled one at a time: the next line is not read until the
//! current call has been answered. Logging goes to stderr or a file, never
//! stdout.

pub mod jsonrpc;

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::core::tools::{self, ToolOutput};
use crate::inference::CompletionProvider;
use jsonrpc::{INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "chatgpt-mcp-server";

pub struct McpServer {
    provider: Arc<dyn CompletionProvider>,
}

impl McpServer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Handles one raw line. Returns `None` when nothing should be written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("unparseable JSON-RPC message: {e}");
                Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("JSON-RPC method={} id={:?}", request.method, request.id);

        if request.is_notification() {
            // initialized, cancelled, etc. need no reply
            debug!("notification {} acknowledged", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                request.id,
                json!({ "tools": tools::available() }),
            ),
            "tools/call" => self.call_tool(request.id, &request.params).await,
            other => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };
        Some(response)
    }

    async fn call_tool(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        info!("tools/call {name}");
        let output = tools::execute(self.provider.as_ref(), name, arguments).await;
        JsonRpcResponse::success(id, tool_result(output))
    }

    /// Reads requests from `reader` until EOF, writing one response line per request.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let encoded = serde_json::to_string(&response)?;
                writer.write_all(encoded.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, stopping");
        Ok(())
    }
}

/// Wraps tool output as a single text content item.
fn tool_result(output: ToolOutput) -> Value {
    json!({
        "content": [{ "type": "text", "text": output.text }],
    })
}

/// Serves MCP on the process's stdin/stdout.
pub async fn serve_stdio(provider: Arc<dyn CompletionProvider>) -> std::io::Result<()> {
    info!("MCP stdio server starting (provider: {})", provider.name());
    McpServer::new(provider)
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubProvider;

    fn server(stub: StubProvider) -> McpServer {
        McpServer::new(Arc::new(stub))
    }

    async fn run(server: &McpServer, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_reports_tools_capability() {
        let s = server(StubProvider::replying("unused"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(out[0]["result"]["serverInfo"]["name"], SERVER_NAME);
        assert!(out[0]["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let s = server(StubProvider::replying("unused"));
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#,
            "\n",
        );
        let out = run(&s, input).await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], "p");
        assert_eq!(out[0]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_null_id_request_gets_reply() {
        let s = server(StubProvider::replying("unused"));
        let out = run(&s, r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).await;

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], Value::Null);
        assert_eq!(out[0]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list_returns_two_tools() {
        let s = server(StubProvider::replying("unused"));
        let out = run(&s, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;

        let tools = out[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "chat_with_gpt");
        assert!(tools[0]["inputSchema"]["properties"]["message"].is_object());
        assert_eq!(tools[1]["name"], "analyze_text");
        assert!(tools[1]["inputSchema"]["properties"]["analysis_type"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_single_text_item() {
        let s = server(StubProvider::replying("unused"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"bar","arguments":{}}}"#,
        )
        .await;

        assert_eq!(
            out[0]["result"],
            json!({ "content": [{ "type": "text", "text": "Unknown tool: bar" }] })
        );
    }

    #[tokio::test]
    async fn test_chat_tool_call() {
        let s = server(StubProvider::replying("Hi!"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"chat_with_gpt","arguments":{"message":"hello"}}}"#,
        )
        .await;

        let content = out[0]["result"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["text"], "Hi!");
        assert!(out[0]["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_analyze_with_bad_kind_reports_inline_text() {
        let s = server(StubProvider::replying("unused"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"analyze_text","arguments":{"text":"x","analysis_type":"poetry"}}}"#,
        )
        .await;

        let result = &out[0]["result"];
        assert!(result.get("isError").is_none());
        assert_eq!(result["content"].as_array().unwrap().len(), 1);
        assert!(
            result["content"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("Error analyzing text: ")
        );
    }

    #[tokio::test]
    async fn test_call_without_name_is_invalid_params() {
        let s = server(StubProvider::replying("unused"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{}}"#,
        )
        .await;
        assert_eq!(out[0]["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_garbage_line_is_parse_error_and_loop_continues() {
        let s = server(StubProvider::replying("unused"));
        let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n";
        let out = run(&s, input).await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(out[0]["id"], Value::Null);
        assert_eq!(out[1]["id"], 7);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let s = server(StubProvider::replying("unused"));
        let out = run(
            &s,
            r#"{"jsonrpc":"2.0","id":8,"method":"resources/list"}"#,
        )
        .await;
        assert_eq!(out[0]["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_poison_later_calls() {
        let s = server(StubProvider::failing("boom"));
        let call = r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"chat_with_gpt","arguments":{"message":"a"}}}"#;
        let input = format!("{call}\n{call}\n");
        let out = run(&s, &input).await;

        assert_eq!(out.len(), 2);
        for response in out {
            let text = response["result"]["content"][0]["text"].as_str().unwrap();
            assert!(text.starts_with("Error calling ChatGPT: "));
        }
    }
}
