use crate::app::App;
use crate::config::Settings;
use crate::constants::server::{NAME, PROTOCOL_VERSION, VERSION};
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{allowed_keys, list_tools, tool_by_name, tool_names, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::utils::arg_aliases::normalize_args_aliases;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

/// Wraps a tool payload as an MCP tool result. The text block carries the
/// same object as `structuredContent`, serialized without ASCII escaping.
pub fn tool_result(payload: &Value, is_error: bool) -> Value {
    let text = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    serde_json::json!({
        "content": [ { "type": "text", "text": text } ],
        "structuredContent": payload,
        "isError": is_error,
    })
}

#[derive(Clone)]
pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "listChanged": false }
            },
            "serverInfo": { "name": NAME, "version": VERSION }
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": list_tools() })
    }

    fn handle_resources_list(&self) -> Value {
        serde_json::json!({ "resources": [ self.app.chart_view.descriptor() ] })
    }

    fn handle_resources_read(&self, params: &Value) -> Result<Value, McpError> {
        let uri = params.get("uri").and_then(|v| v.as_str()).unwrap_or("");
        if uri == self.app.chart_view.uri() {
            return Ok(self.app.chart_view.contents());
        }
        Err(McpError::new(
            ErrorCode::ResourceNotFound,
            format!("Resource not found: {}", uri),
        )
        .with_data(serde_json::json!({ "uri": uri })))
    }

    /// Unknown tools are protocol errors; everything a known tool does wrong
    /// comes back as an `isError` tool result.
    pub async fn handle_tools_call(&self, name: &str, args: Value) -> Result<Value, McpError> {
        if tool_by_name(name).is_none() {
            let err = unknown_tool_error(name, &tool_names());
            let message = match &err.hint {
                Some(hint) => format!("{}. {}", err.message, hint),
                None => err.message.clone(),
            };
            return Err(McpError::new(ErrorCode::InvalidParams, message)
                .with_data(err.details.unwrap_or(Value::Null)));
        }

        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };
        let allowed = allowed_keys(name);
        let (args, normalization) = normalize_args_aliases(&args, name, allowed.as_ref());
        if let Some(normalization) = normalization {
            self.app.logger.debug(
                "normalized argument aliases",
                Some(&serde_json::json!({ "tool": name, "normalization": normalization })),
            );
        }

        let outcome = match validate_tool_args(name, &args) {
            Ok(()) => self.app.tool_executor.execute(name, args).await,
            Err(err) => Err(err),
        };
        Ok(match outcome {
            Ok(payload) => tool_result(&payload, false),
            Err(err) => tool_result(&err.to_result_value(), true),
        })
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") && request.is_notification() {
            return None;
        }
        let id = request.id.clone()?;
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => {
                let params = request.params.as_object().cloned().unwrap_or_default();
                let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
                if name.is_empty() {
                    Err(McpError::new(ErrorCode::InvalidParams, "Missing tool name"))
                } else {
                    let args = params.get("arguments").cloned().unwrap_or(Value::Null);
                    self.handle_tools_call(name, args).await
                }
            }
            "resources/list" => Ok(self.handle_resources_list()),
            "resources/read" => self.handle_resources_read(&request.params),
            _ => Err(McpError::new(ErrorCode::MethodNotFound, "Method not found")),
        };
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err),
        })
    }

    /// One line of input, one optional response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::new(ErrorCode::ParseError, "Parse error"),
                ))
            }
        };
        let id = parsed.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(parsed) {
            Ok(request) => self.handle_request(request).await,
            Err(_) => Some(JsonRpcResponse::failure(
                id,
                McpError::new(ErrorCode::InvalidRequest, "Invalid request"),
            )),
        }
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        let mut writer = BufWriter::new(writer);

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|err| ToolError::internal(err.to_string()))?
        {
            if let Some(response) = self.handle_line(&line).await {
                let payload = serde_json::to_string(&response).unwrap_or_default();
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

pub async fn run_stdio(settings: Settings) -> Result<(), ToolError> {
    let app = App::initialize(settings)?;
    app.logger.info(
        "finsage MCP server ready",
        Some(&serde_json::json!({
            "version": VERSION,
            "tools": tool_names().len(),
            "base_url": app.settings.base_url,
            "bulk_concurrency": app.settings.bulk_concurrency,
        })),
    );
    McpServer::new(app).run_stdio().await
}
