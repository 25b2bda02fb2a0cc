use crate::constants::{limits, ui, upstream};
use crate::errors::ToolError;
use crate::services::logger::Logger;
use std::path::PathBuf;

/// Process configuration, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub http_timeout_ms: Option<u64>,
    pub bulk_concurrency: usize,
    pub bulk_max_symbols: usize,
    pub chart_template: Option<PathBuf>,
}

impl Settings {
    /// Fails when the credential is missing: the server must not start without it.
    pub fn from_env() -> Result<Self, ToolError> {
        let api_key = std::env::var(upstream::API_KEY_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ToolError::invalid_params(format!("{} is not configured", upstream::API_KEY_ENV))
                    .with_hint("Add your Finnhub API key to the environment or a .env file")
            })?;
        Ok(Self::with_api_key(api_key))
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let base_url = std::env::var(upstream::BASE_URL_ENV)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| upstream::DEFAULT_BASE_URL.to_string());
        Self {
            api_key: api_key.into(),
            base_url,
            http_timeout_ms: env_u64("FINSAGE_HTTP_TIMEOUT_MS").filter(|ms| *ms > 0),
            bulk_concurrency: env_u64("FINSAGE_BULK_CONCURRENCY")
                .map(|n| n.max(1) as usize)
                .unwrap_or(limits::DEFAULT_BULK_CONCURRENCY),
            bulk_max_symbols: env_u64("FINSAGE_BULK_MAX_SYMBOLS")
                .map(|n| n.max(1) as usize)
                .unwrap_or(limits::DEFAULT_BULK_MAX_SYMBOLS),
            chart_template: std::env::var(ui::TEMPLATE_ENV)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Loads `.env` from the working directory or the nearest ancestor holding one.
pub fn load_dotenv(logger: &Logger) -> Option<PathBuf> {
    report_dotenv(dotenvy::dotenv(), logger)
}

fn report_dotenv(outcome: dotenvy::Result<PathBuf>, logger: &Logger) -> Option<PathBuf> {
    match outcome {
        Ok(path) => {
            logger.debug(
                "loaded .env",
                Some(&serde_json::json!({ "path": path.display().to_string() })),
            );
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            logger.warn(
                "failed to load .env",
                Some(&serde_json::json!({ "error": err.to_string() })),
            );
            None
        }
    }
}
