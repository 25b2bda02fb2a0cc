use super::to_json;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::normalizer::{EndpointKind, RecordContext};
use crate::services::pipeline::MarketDataPipeline;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

pub const FINANCIALS_TOOLS: &[&str] = &["GET_BASIC_FINANCIALS"];
const DEFAULT_METRIC: &str = "all";

#[derive(Clone)]
pub struct FinancialsManager {
    logger: Logger,
    validation: Validation,
    pipeline: Arc<MarketDataPipeline>,
}

impl FinancialsManager {
    pub fn new(logger: Logger, validation: Validation, pipeline: Arc<MarketDataPipeline>) -> Self {
        Self {
            logger: logger.child("financials"),
            validation,
            pipeline,
        }
    }

    pub async fn basic_financials(&self, args: &Value) -> Result<Value, ToolError> {
        let symbol = self.validation.ensure_symbol(args.get("symbol"))?;
        let metric = self
            .validation
            .ensure_optional_string(args.get("metric"), "metric")?
            .unwrap_or_else(|| DEFAULT_METRIC.to_string());

        let request = MarketDataPipeline::request(EndpointKind::BasicFinancials)
            .param("symbol", &symbol)
            .param("metric", &metric);
        let record = self
            .pipeline
            .fetch_one(
                EndpointKind::BasicFinancials,
                &request,
                &RecordContext::for_symbol(&symbol),
            )
            .await?;
        to_json(&record)
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for FinancialsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, Some(&args));
        match tool {
            "GET_BASIC_FINANCIALS" => self.basic_financials(&args).await,
            _ => Err(unknown_tool_error(tool, FINANCIALS_TOOLS)),
        }
    }
}
