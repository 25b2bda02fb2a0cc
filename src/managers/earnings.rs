use super::to_json;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::normalizer::{EndpointKind, RecordContext};
use crate::services::pipeline::MarketDataPipeline;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

pub const EARNINGS_TOOLS: &[&str] = &["GET_EARNINGS_CALENDAR", "GET_EARNING_SURPRISES"];

#[derive(Clone)]
pub struct EarningsManager {
    logger: Logger,
    validation: Validation,
    pipeline: Arc<MarketDataPipeline>,
}

impl EarningsManager {
    pub fn new(logger: Logger, validation: Validation, pipeline: Arc<MarketDataPipeline>) -> Self {
        Self {
            logger: logger.child("earnings"),
            validation,
            pipeline,
        }
    }

    pub async fn calendar(&self, args: &Value) -> Result<Value, ToolError> {
        let from = self
            .validation
            .ensure_optional_date(args.get("from_date"), "from_date")?;
        let to = self
            .validation
            .ensure_optional_date(args.get("to_date"), "to_date")?;
        self.validation
            .ensure_date_range(from.as_deref(), to.as_deref())?;
        let symbol = self.validation.ensure_optional_symbol(args.get("symbol"))?;
        let international = self
            .validation
            .ensure_optional_bool(args.get("international"), "international")?
            .unwrap_or(false);

        let request = MarketDataPipeline::request(EndpointKind::EarningsCalendar)
            .param_opt("from", from.as_deref())
            .param_opt("to", to.as_deref())
            .param_opt("symbol", symbol.as_deref())
            .param_opt("international", international.then_some("true"));
        let ctx = RecordContext {
            symbol: symbol.clone(),
        };
        let earnings = self
            .pipeline
            .fetch(EndpointKind::EarningsCalendar, &request, &ctx)
            .await?;
        Ok(serde_json::json!({
            "from": from,
            "to": to,
            "symbol": symbol,
            "count": earnings.len(),
            "earnings": to_json(&earnings)?,
        }))
    }

    pub async fn surprises(&self, args: &Value) -> Result<Value, ToolError> {
        let symbol = self.validation.ensure_symbol(args.get("symbol"))?;
        let limit = self
            .validation
            .ensure_optional_int(args.get("limit"), "limit", 1)?;

        let request = MarketDataPipeline::request(EndpointKind::EarningsSurprises)
            .param("symbol", &symbol)
            .param_opt("limit", limit);
        let earnings = self
            .pipeline
            .fetch(
                EndpointKind::EarningsSurprises,
                &request,
                &RecordContext::for_symbol(&symbol),
            )
            .await?;
        Ok(serde_json::json!({
            "symbol": symbol,
            "count": earnings.len(),
            "earnings": to_json(&earnings)?,
        }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for EarningsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, Some(&args));
        match tool {
            "GET_EARNINGS_CALENDAR" => self.calendar(&args).await,
            "GET_EARNING_SURPRISES" => self.surprises(&args).await,
            _ => Err(unknown_tool_error(tool, EARNINGS_TOOLS)),
        }
    }
}
