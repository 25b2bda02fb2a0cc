use super::to_json;
use crate::constants::news::{CATEGORIES, DEFAULT_CATEGORY};
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::normalizer::{EndpointKind, RecordContext};
use crate::services::pipeline::MarketDataPipeline;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

pub const NEWS_TOOLS: &[&str] = &["GET_MARKET_NEWS", "GET_COMPANY_NEWS"];

#[derive(Clone)]
pub struct NewsManager {
    logger: Logger,
    validation: Validation,
    pipeline: Arc<MarketDataPipeline>,
}

impl NewsManager {
    pub fn new(logger: Logger, validation: Validation, pipeline: Arc<MarketDataPipeline>) -> Self {
        Self {
            logger: logger.child("news"),
            validation,
            pipeline,
        }
    }

    pub async fn market_news(&self, args: &Value) -> Result<Value, ToolError> {
        let category = self
            .validation
            .ensure_optional_string(args.get("category"), "category")?
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let category = self.validation.ensure_one_of(category, "category", CATEGORIES)?;
        // 0 means "no floor" and is not sent.
        let min_id = self
            .validation
            .ensure_optional_int(args.get("min_id"), "min_id", 0)?
            .unwrap_or(0);

        let request = MarketDataPipeline::request(EndpointKind::MarketNews)
            .param("category", &category)
            .param_opt("minId", (min_id > 0).then_some(min_id));
        let news = self
            .pipeline
            .fetch(EndpointKind::MarketNews, &request, &RecordContext::default())
            .await?;
        Ok(serde_json::json!({
            "category": category,
            "count": news.len(),
            "news": to_json(&news)?,
        }))
    }

    pub async fn company_news(&self, args: &Value) -> Result<Value, ToolError> {
        let symbol = self.validation.ensure_symbol(args.get("symbol"))?;
        let from = self.validation.ensure_date(args.get("from_date"), "from_date")?;
        let to = self.validation.ensure_date(args.get("to_date"), "to_date")?;
        self.validation.ensure_date_range(Some(&from), Some(&to))?;

        let request = MarketDataPipeline::request(EndpointKind::CompanyNews)
            .param("symbol", &symbol)
            .param("from", &from)
            .param("to", &to);
        let news = self
            .pipeline
            .fetch(
                EndpointKind::CompanyNews,
                &request,
                &RecordContext::for_symbol(&symbol),
            )
            .await?;
        Ok(serde_json::json!({
            "symbol": symbol,
            "from": from,
            "to": to,
            "count": news.len(),
            "news": to_json(&news)?,
        }))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for NewsManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, Some(&args));
        match tool {
            "GET_MARKET_NEWS" => self.market_news(&args).await,
            "GET_COMPANY_NEWS" => self.company_news(&args).await,
            _ => Err(unknown_tool_error(tool, NEWS_TOOLS)),
        }
    }
}
