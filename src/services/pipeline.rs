use crate::errors::UpstreamError;
use crate::services::logger::Logger;
use crate::services::normalizer::{normalize, EndpointKind, NormalizedRecord, RecordContext, ResponseShape};
use crate::services::upstream::{MarketDataSource, UpstreamRequest};
use serde_json::Value;
use std::sync::Arc;

/// Fetch-then-normalize for every endpoint family, driven by the endpoint table.
#[derive(Clone)]
pub struct MarketDataPipeline {
    logger: Logger,
    source: Arc<dyn MarketDataSource>,
}

impl MarketDataPipeline {
    pub fn new(logger: Logger, source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            logger: logger.child("pipeline"),
            source,
        }
    }

    /// Starts a request against the endpoint path registered for `kind`.
    pub fn request(kind: EndpointKind) -> UpstreamRequest {
        UpstreamRequest::new(kind.path())
    }

    pub async fn fetch(
        &self,
        kind: EndpointKind,
        request: &UpstreamRequest,
        ctx: &RecordContext,
    ) -> Result<Vec<NormalizedRecord>, UpstreamError> {
        let raw = self.source.fetch(request).await?;
        reject_error_payload(&raw)?;
        let records = extract_records(kind.shape(), &raw)?;
        self.logger.debug(
            "normalized upstream records",
            Some(&serde_json::json!({
                "endpoint": request.endpoint(),
                "records": records.len(),
            })),
        );
        Ok(records
            .into_iter()
            .map(|raw| normalize(kind, raw, ctx))
            .collect())
    }

    /// Single-record endpoints (quote, basic financials).
    pub async fn fetch_one(
        &self,
        kind: EndpointKind,
        request: &UpstreamRequest,
        ctx: &RecordContext,
    ) -> Result<NormalizedRecord, UpstreamError> {
        self.fetch(kind, request, ctx)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::decode(200, "empty response"))
    }
}

/// The provider occasionally answers 200 with `{"error": "..."}`.
fn reject_error_payload(raw: &Value) -> Result<(), UpstreamError> {
    match raw.get("error") {
        Some(Value::String(message)) => Err(UpstreamError::decode(200, message.clone())),
        Some(other) if !other.is_null() => Err(UpstreamError::decode(200, other.to_string())),
        _ => Ok(()),
    }
}

fn extract_records(shape: ResponseShape, raw: &Value) -> Result<Vec<&Value>, UpstreamError> {
    match shape {
        ResponseShape::List => match raw {
            Value::Array(items) => Ok(items.iter().collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(unexpected_shape("array", other)),
        },
        ResponseShape::Wrapped(key) => match raw {
            Value::Object(map) => match map.get(key) {
                Some(Value::Array(items)) => Ok(items.iter().collect()),
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(other) => Err(unexpected_shape("array", other)),
            },
            other => Err(unexpected_shape("object", other)),
        },
        ResponseShape::Object => match raw {
            Value::Object(_) => Ok(vec![raw]),
            other => Err(unexpected_shape("object", other)),
        },
    }
}

fn unexpected_shape(expected: &str, got: &Value) -> UpstreamError {
    let got = match got {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    UpstreamError::decode(200, format!("expected {}, got {}", expected, got))
}
