use crate::errors::ToolError;
use crate::services::chart::{build_chart, chart_envelope, ChartRequest};
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;

pub const CHART_TOOLS: &[&str] = &["SET_CHART"];

/// Emits chart payloads; never renders and never touches the network.
#[derive(Clone)]
pub struct ChartManager {
    logger: Logger,
}

impl ChartManager {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("chart"),
        }
    }

    pub fn set_chart(&self, args: Value) -> Result<Value, ToolError> {
        let spec = build_chart(ChartRequest::from_args(args)?)?;
        self.logger.info(
            "chart generated",
            Some(&serde_json::json!({
                "kind": spec.kind.as_str(),
                "series": spec.series.len(),
                "labels": spec.labels.len(),
            })),
        );
        Ok(chart_envelope(&spec))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for ChartManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        match tool {
            "SET_CHART" => self.set_chart(args),
            _ => Err(unknown_tool_error(tool, CHART_TOOLS)),
        }
    }
}
