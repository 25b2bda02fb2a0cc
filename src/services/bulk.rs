use crate::services::logger::Logger;
use crate::services::normalizer::normalize_symbol;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

const BLANK_SYMBOL_ERROR: &str = "symbol must be a non-empty string";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkError {
    pub symbol: String,
    pub error: String,
}

/// Consolidated outcome of a batch. Successes and failures are two separate
/// streams, each in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult<T> {
    pub total_requested: usize,
    pub successful: usize,
    pub failed: usize,
    pub items: Vec<T>,
    pub errors: Option<Vec<BulkError>>,
}

impl<T: Serialize> BulkResult<T> {
    /// Renders the batch under `items_key`; `errors` is `null` when nothing failed.
    pub fn to_payload(&self, items_key: &str) -> Value {
        let mut out = serde_json::Map::new();
        out.insert("total_requested".to_string(), Value::from(self.total_requested));
        out.insert("successful".to_string(), Value::from(self.successful));
        out.insert("failed".to_string(), Value::from(self.failed));
        out.insert(
            items_key.to_string(),
            serde_json::to_value(&self.items).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        out.insert(
            "errors".to_string(),
            match &self.errors {
                Some(errors) => serde_json::to_value(errors).unwrap_or(Value::Null),
                None => Value::Null,
            },
        );
        Value::Object(out)
    }
}

#[derive(Clone)]
pub struct BulkAggregator {
    logger: Logger,
    concurrency: usize,
}

impl BulkAggregator {
    pub fn new(logger: Logger, concurrency: usize) -> Self {
        Self {
            logger: logger.child("bulk"),
            concurrency: concurrency.max(1),
        }
    }

    /// Runs `fetch` once per identifier (uppercased, trimmed). Items run
    /// concurrently up to the configured limit; one item failing or panicking
    /// never affects another. Blank identifiers fail on their own without a
    /// fetch.
    pub async fn aggregate<T, E, F, Fut>(&self, identifiers: &[String], fetch: F) -> BulkResult<T>
    where
        E: Display,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let symbols: Vec<String> = identifiers.iter().map(|raw| normalize_symbol(raw)).collect();
        let calls = symbols.into_iter().map(|symbol| {
            let call = (!symbol.is_empty())
                .then(|| AssertUnwindSafe(fetch(symbol.clone())).catch_unwind());
            async move {
                let outcome = match call {
                    None => Err(BLANK_SYMBOL_ERROR.to_string()),
                    Some(call) => match call.await {
                        Ok(Ok(item)) => Ok(item),
                        Ok(Err(err)) => Err(err.to_string()),
                        Err(_) => Err("internal error while processing symbol".to_string()),
                    },
                };
                (symbol, outcome)
            }
        });
        let outcomes: Vec<(String, Result<T, String>)> = stream::iter(calls)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut items = Vec::new();
        let mut errors = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(item) => items.push(item),
                Err(error) => errors.push(BulkError { symbol, error }),
            }
        }

        let result = BulkResult {
            total_requested: identifiers.len(),
            successful: items.len(),
            failed: errors.len(),
            items,
            errors: if errors.is_empty() { None } else { Some(errors) },
        };
        self.logger.info(
            "bulk batch completed",
            Some(&serde_json::json!({
                "total_requested": result.total_requested,
                "successful": result.successful,
                "failed": result.failed,
            })),
        );
        result
    }
}
