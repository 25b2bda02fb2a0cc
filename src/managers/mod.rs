pub mod chart;
pub mod earnings;
pub mod financials;
pub mod news;
pub mod quotes;

use crate::errors::ToolError;
use serde::Serialize;
use serde_json::Value;

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|err| ToolError::internal(format!("Failed to serialize result: {}", err)))
}
