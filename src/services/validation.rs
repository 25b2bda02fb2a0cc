use crate::errors::ToolError;
use crate::services::normalizer::normalize_symbol;
use chrono::NaiveDate;
use serde_json::Value;

/// Argument checks shared by the tool handlers. Schema validation runs first;
/// these enforce what JSON Schema cannot express and produce the error text.
#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(&self, value: Option<&Value>, label: &str) -> Result<String, ToolError> {
        let text = value.and_then(|v| v.as_str()).map(str::trim).unwrap_or("");
        if text.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(text.to_string())
    }

    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(val) => self.ensure_string(Some(val), label).map(Some),
        }
    }

    /// Non-empty ticker, echoed back uppercased.
    pub fn ensure_symbol(&self, value: Option<&Value>) -> Result<String, ToolError> {
        self.ensure_string(value, "symbol")
            .map(|symbol| normalize_symbol(&symbol))
    }

    pub fn ensure_optional_symbol(&self, value: Option<&Value>) -> Result<Option<String>, ToolError> {
        Ok(self
            .ensure_optional_string(value, "symbol")?
            .map(|symbol| normalize_symbol(&symbol)))
    }

    /// Calendar date in `YYYY-MM-DD` form.
    pub fn ensure_date(&self, value: Option<&Value>, label: &str) -> Result<String, ToolError> {
        let text = self.ensure_string(value, label)?;
        NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
            ToolError::invalid_params(format!("{} must be a date in YYYY-MM-DD format", label))
        })?;
        Ok(text)
    }

    pub fn ensure_optional_date(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ToolError> {
        match self.ensure_optional_string(value, label)? {
            Some(text) => self.ensure_date(Some(&Value::String(text)), label).map(Some),
            None => Ok(None),
        }
    }

    /// Both bounds are `YYYY-MM-DD`, so string order is date order.
    pub fn ensure_date_range(&self, from: Option<&str>, to: Option<&str>) -> Result<(), ToolError> {
        match (from, to) {
            (Some(from), Some(to)) if from > to => Err(ToolError::invalid_params(
                "from_date must not be after to_date",
            )),
            _ => Ok(()),
        }
    }

    /// Every element must be a string. Blank entries are kept so the caller
    /// can report them per item.
    pub fn ensure_string_list(&self, value: Option<&Value>, label: &str) -> Result<Vec<String>, ToolError> {
        let items = value.and_then(|v| v.as_array()).ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be an array of strings", label))
        })?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ToolError::invalid_params(format!("{}[{}] must be a string", label, idx))
                })
            })
            .collect()
    }

    pub fn ensure_optional_int(
        &self,
        value: Option<&Value>,
        label: &str,
        min: i64,
    ) -> Result<Option<i64>, ToolError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        let numeric = value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be an integer", label)))?;
        if numeric < min {
            return Err(ToolError::invalid_params(format!(
                "{} must be >= {}",
                label, min
            )));
        }
        Ok(Some(numeric))
    }

    pub fn ensure_optional_bool(&self, value: Option<&Value>, label: &str) -> Result<Option<bool>, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(ToolError::invalid_params(format!("{} must be a boolean", label))),
            },
            Some(_) => Err(ToolError::invalid_params(format!("{} must be a boolean", label))),
        }
    }

    pub fn ensure_one_of(&self, value: String, label: &str, allowed: &[&str]) -> Result<String, ToolError> {
        if allowed.contains(&value.as_str()) {
            return Ok(value);
        }
        Err(ToolError::invalid_params(format!(
            "{} must be one of: {}",
            label,
            allowed.join(", ")
        )))
    }
}
