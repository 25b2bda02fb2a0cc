use super::to_json;
use crate::errors::{ToolError, UpstreamError};
use crate::services::bulk::BulkAggregator;
use crate::services::logger::Logger;
use crate::services::normalizer::{EndpointKind, NormalizedRecord, Quote, RecordContext};
use crate::services::pipeline::MarketDataPipeline;
use crate::services::validation::Validation;
use crate::utils::tool_errors::unknown_tool_error;
use serde_json::Value;
use std::sync::Arc;

pub const QUOTE_TOOLS: &[&str] = &["GET_QUOTE", "GET_BULK_QUOTES"];

#[derive(Clone)]
pub struct QuotesManager {
    logger: Logger,
    validation: Validation,
    pipeline: Arc<MarketDataPipeline>,
    bulk: BulkAggregator,
    max_symbols: usize,
}

impl QuotesManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        pipeline: Arc<MarketDataPipeline>,
        bulk: BulkAggregator,
        max_symbols: usize,
    ) -> Self {
        Self {
            logger: logger.child("quotes"),
            validation,
            pipeline,
            bulk,
            max_symbols,
        }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, UpstreamError> {
        let request = MarketDataPipeline::request(EndpointKind::Quote).param("symbol", symbol);
        match self
            .pipeline
            .fetch_one(EndpointKind::Quote, &request, &RecordContext::for_symbol(symbol))
            .await?
        {
            NormalizedRecord::Quote(quote) => Ok(quote),
            _ => Err(UpstreamError::decode(200, "expected a quote record")),
        }
    }

    pub async fn quote(&self, args: &Value) -> Result<Value, ToolError> {
        let symbol = self.validation.ensure_symbol(args.get("symbol"))?;
        let quote = self.fetch_quote(&symbol).await?;
        to_json(&quote)
    }

    pub async fn bulk_quotes(&self, args: &Value) -> Result<Value, ToolError> {
        let symbols = self
            .validation
            .ensure_string_list(args.get("symbols"), "symbols")?;
        if symbols.is_empty() {
            return Err(ToolError::invalid_params("symbols must contain at least one symbol"));
        }
        if symbols.len() > self.max_symbols {
            return Err(ToolError::invalid_params(format!(
                "symbols accepts at most {} entries, got {}",
                self.max_symbols,
                symbols.len()
            ))
            .with_hint("Split the request into smaller batches"));
        }

        let result = self
            .bulk
            .aggregate(&symbols, |symbol| async move { self.fetch_quote(&symbol).await })
            .await;
        Ok(result.to_payload("quotes"))
    }
}

#[async_trait::async_trait]
impl crate::services::tool_executor::ToolHandler for QuotesManager {
    async fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.logger.debug(tool, Some(&args));
        match tool {
            "GET_QUOTE" => self.quote(&args).await,
            "GET_BULK_QUOTES" => self.bulk_quotes(&args).await,
            _ => Err(unknown_tool_error(tool, QUOTE_TOOLS)),
        }
    }
}
