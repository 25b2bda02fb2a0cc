use crate::config::Settings;
use crate::constants::{limits, upstream};
use crate::errors::{ToolError, UpstreamError, UpstreamResult};
use crate::services::logger::Logger;
use crate::utils::text::truncate_utf8_prefix;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// One GET against the provider: endpoint path plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    endpoint: String,
    params: BTreeMap<String, String>,
}

impl UpstreamRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn param_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Source of raw upstream JSON. The HTTP client is the production
/// implementation; tests substitute in-memory sources.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, request: &UpstreamRequest) -> UpstreamResult;
}

#[derive(Clone)]
pub struct FinnhubClient {
    logger: Logger,
    client: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(logger: Logger, settings: &Settings) -> Result<Self, ToolError> {
        let mut builder = Client::builder().user_agent(upstream::USER_AGENT);
        if let Some(timeout_ms) = settings.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("upstream"),
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl MarketDataSource for FinnhubClient {
    async fn fetch(&self, request: &UpstreamRequest) -> UpstreamResult {
        let started = Instant::now();
        let response = self
            .client
            .get(self.url_for(request.endpoint()))
            .query(request.params())
            .query(&[(upstream::TOKEN_PARAM, self.api_key.as_str())])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                let err = UpstreamError::from(err);
                self.logger.warn(
                    "upstream transport failure",
                    Some(&serde_json::json!({
                        "endpoint": request.endpoint(),
                        "error": err.to_string(),
                    })),
                );
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(UpstreamError::from)?;
        self.logger.debug(
            "upstream response",
            Some(&serde_json::json!({
                "endpoint": request.endpoint(),
                "params": request.params(),
                "status": status.as_u16(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );

        if status != StatusCode::OK {
            self.logger.warn(
                "upstream rejected request",
                Some(&serde_json::json!({
                    "endpoint": request.endpoint(),
                    "status": status.as_u16(),
                    "body": truncate_utf8_prefix(&body, limits::LOG_BODY_PREVIEW_BYTES),
                })),
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Value>(&body)
            .map_err(|err| UpstreamError::decode(status.as_u16(), err.to_string()))
    }
}
