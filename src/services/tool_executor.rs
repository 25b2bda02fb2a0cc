use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;

use serde_json::Value;

/// One handler may serve several tools of the same family; `tool` is the
/// catalog name being invoked.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn has_handler(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Dispatches to the registered handler. Arguments are expected to be
    /// alias-normalized and schema-checked already.
    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool).cloned() else {
            return Err(unknown_tool_error(tool, &self.tool_names()));
        };
        let trace_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        self.logger.debug(
            "tool call started",
            Some(&serde_json::json!({ "tool": tool, "trace_id": trace_id })),
        );

        let result = handler.handle(tool, args).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(value) => self.logger.debug(
                "tool call finished",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                    "result": summarize_result(value),
                })),
            ),
            Err(err) => self.logger.warn(
                "tool call failed",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                    "code": err.code,
                    "error": err.message,
                })),
            ),
        }
        result
    }
}

fn summarize_result(result: &Value) -> Value {
    match result {
        Value::Array(arr) => serde_json::json!({ "type": "array", "length": arr.len() }),
        Value::Object(obj) => {
            let keys: Vec<&String> = obj.keys().take(10).collect();
            serde_json::json!({ "type": "object", "keys": keys })
        }
        Value::Null => serde_json::json!({ "type": "null" }),
        other => serde_json::json!({ "type": "scalar", "value": other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
            Ok(serde_json::json!({ "tool": tool, "args": args }))
        }
    }

    fn executor() -> ToolExecutor {
        let echo: Arc<dyn ToolHandler> = Arc::new(Echo);
        let mut handlers = HashMap::new();
        handlers.insert("GET_QUOTE".to_string(), echo.clone());
        handlers.insert("GET_BULK_QUOTES".to_string(), echo);
        ToolExecutor::new(Logger::new("test"), handlers)
    }

    #[tokio::test]
    async fn routes_tool_name_to_shared_handler() {
        let out = executor()
            .execute("GET_BULK_QUOTES", serde_json::json!({ "symbols": ["A"] }))
            .await
            .expect("ok");
        assert_eq!(out["tool"], "GET_BULK_QUOTES");
    }

    #[tokio::test]
    async fn unknown_tool_carries_suggestions() {
        let err = executor()
            .execute("GET_QUOTES", serde_json::json!({}))
            .await
            .expect_err("unknown");
        assert_eq!(err.message, "Unknown tool: GET_QUOTES");
        assert!(err.hint.unwrap_or_default().contains("GET_QUOTE"));
    }
}
