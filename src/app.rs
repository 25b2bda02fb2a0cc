use crate::config::Settings;
use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::tool_catalog;
use crate::services::bulk::BulkAggregator;
use crate::services::logger::Logger;
use crate::services::pipeline::MarketDataPipeline;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::upstream::{FinnhubClient, MarketDataSource};
use crate::services::validation::Validation;
use crate::ui::resource::ChartViewResource;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub settings: Settings,
    pub tool_executor: Arc<ToolExecutor>,
    pub chart_view: ChartViewResource,
}

impl App {
    fn validate_tool_wiring(handlers: &HashMap<String, Arc<dyn ToolHandler>>) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a registered handler")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Production wiring against the Finnhub HTTP API.
    pub fn initialize(settings: Settings) -> Result<Self, ToolError> {
        let logger = Logger::new("finsage");
        let client = FinnhubClient::new(logger.clone(), &settings)?;
        Self::with_source(settings, Arc::new(client), logger)
    }

    pub fn with_source(
        settings: Settings,
        source: Arc<dyn MarketDataSource>,
        logger: Logger,
    ) -> Result<Self, ToolError> {
        let validation = Validation::new();
        let pipeline = Arc::new(MarketDataPipeline::new(logger.clone(), source));
        let bulk = BulkAggregator::new(logger.clone(), settings.bulk_concurrency);

        let news_manager = Arc::new(managers::news::NewsManager::new(
            logger.clone(),
            validation.clone(),
            pipeline.clone(),
        ));
        let earnings_manager = Arc::new(managers::earnings::EarningsManager::new(
            logger.clone(),
            validation.clone(),
            pipeline.clone(),
        ));
        let quotes_manager = Arc::new(managers::quotes::QuotesManager::new(
            logger.clone(),
            validation.clone(),
            pipeline.clone(),
            bulk,
            settings.bulk_max_symbols,
        ));
        let financials_manager = Arc::new(managers::financials::FinancialsManager::new(
            logger.clone(),
            validation.clone(),
            pipeline.clone(),
        ));
        let chart_manager = Arc::new(managers::chart::ChartManager::new(logger.clone()));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for tool in managers::news::NEWS_TOOLS {
            handlers.insert(tool.to_string(), news_manager.clone());
        }
        for tool in managers::earnings::EARNINGS_TOOLS {
            handlers.insert(tool.to_string(), earnings_manager.clone());
        }
        for tool in managers::quotes::QUOTE_TOOLS {
            handlers.insert(tool.to_string(), quotes_manager.clone());
        }
        for tool in managers::financials::FINANCIALS_TOOLS {
            handlers.insert(tool.to_string(), financials_manager.clone());
        }
        for tool in managers::chart::CHART_TOOLS {
            handlers.insert(tool.to_string(), chart_manager.clone());
        }

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        let chart_view = ChartViewResource::load(settings.chart_template.as_deref(), &logger);

        Ok(Self {
            logger,
            settings,
            tool_executor,
            chart_view,
        })
    }
}
