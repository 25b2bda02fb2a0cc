#![allow(dead_code)]

use async_trait::async_trait;
use finsage::app::App;
use finsage::config::Settings;
use finsage::errors::{UpstreamError, UpstreamResult};
use finsage::mcp::server::McpServer;
use finsage::services::logger::Logger;
use finsage::services::upstream::{MarketDataSource, UpstreamRequest};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// In-memory upstream keyed by endpoint and optional `symbol` param.
#[derive(Default)]
pub struct FakeSource {
    routes: StdMutex<HashMap<String, UpstreamResult>>,
    calls: StdMutex<Vec<UpstreamRequest>>,
}

fn route_key(endpoint: &str, symbol: Option<&str>) -> String {
    match symbol {
        Some(symbol) => format!("{}?symbol={}", endpoint, symbol),
        None => endpoint.to_string(),
    }
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, endpoint: &str, symbol: Option<&str>, body: Value) -> Self {
        self.route(endpoint, symbol, Ok(body))
    }

    pub fn status(self, endpoint: &str, symbol: Option<&str>, status: u16, body: &str) -> Self {
        self.route(
            endpoint,
            symbol,
            Err(UpstreamError::Status {
                status,
                body: body.to_string(),
            }),
        )
    }

    fn route(self, endpoint: &str, symbol: Option<&str>, result: UpstreamResult) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(route_key(endpoint, symbol), result);
        self
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn fetch(&self, request: &UpstreamRequest) -> UpstreamResult {
        self.calls.lock().unwrap().push(request.clone());
        let routes = self.routes.lock().unwrap();
        routes
            .get(&route_key(request.endpoint(), request.get("symbol")))
            .or_else(|| routes.get(request.endpoint()))
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamError::Status {
                    status: 404,
                    body: "no route".to_string(),
                })
            })
    }
}

pub fn test_settings() -> Settings {
    Settings {
        api_key: "test-key".to_string(),
        base_url: "http://127.0.0.1:9".to_string(),
        http_timeout_ms: None,
        bulk_concurrency: 4,
        bulk_max_symbols: 50,
        chart_template: None,
    }
}

pub fn server_with(source: Arc<FakeSource>, settings: Settings) -> McpServer {
    let app = App::with_source(settings, source, Logger::new("test")).expect("app wiring");
    McpServer::new(app)
}

pub fn quote_body(price: f64) -> Value {
    serde_json::json!({
        "c": price, "d": 1.25, "dp": 0.66, "h": price + 2.0, "l": price - 2.0,
        "o": price - 1.0, "pc": price - 1.25, "t": 1_700_000_000
    })
}

/// Parses the text block of a tool result back into JSON.
pub fn result_text_json(result: &Value) -> Value {
    let text = result["content"][0]["text"].as_str().expect("text block");
    serde_json::from_str(text).expect("text block is JSON")
}
