//! Chart-data payloads for the rendering surface.

use crate::errors::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
    Pie,
    Radar,
    PolarArea,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Doughnut,
        ChartKind::Pie,
        ChartKind::Radar,
        ChartKind::PolarArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Pie => "pie",
            ChartKind::Radar => "radar",
            ChartKind::PolarArea => "polarArea",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.as_str()).collect()
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartValidationError;

    /// Exact match only: `Bar` or `scatter` are rejected, never coerced.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| ChartValidationError::UnknownKind(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    #[serde(other)]
    Neutral,
}

impl Trend {
    pub fn glyph(self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Neutral => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(Number),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(num) => write!(f, "{}", num),
            MetricValue::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "valores")]
    pub values: Vec<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetric {
    pub label: String,
    #[serde(alias = "valor")]
    pub value: MetricValue,
    #[serde(default, alias = "tendencia")]
    pub trend: Trend,
}

/// Validated chart description handed to the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "tipo")]
    pub kind: ChartKind,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<ChartSeries>,
    #[serde(default, alias = "metricas")]
    pub metrics: Vec<ChartMetric>,
    #[serde(default)]
    pub insights: Vec<String>,
}

/// Raw `SET_CHART` arguments before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    #[serde(default, alias = "titulo")]
    pub title: Option<String>,
    #[serde(default, alias = "tipo")]
    pub kind: Option<String>,
    #[serde(default)]
    pub labels: Vec<Value>,
    #[serde(default)]
    pub series: Vec<ChartSeries>,
    #[serde(default, alias = "metricas")]
    pub metrics: Vec<ChartMetric>,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl ChartRequest {
    pub fn from_args(args: Value) -> Result<Self, ChartValidationError> {
        serde_json::from_value(args).map_err(|err| ChartValidationError::Malformed(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartValidationError {
    #[error("Invalid chart kind '{0}'. Use one of: line, bar, doughnut, pie, radar, polarArea")]
    UnknownKind(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid label at index {0}: labels must be strings or numbers")]
    InvalidLabel(usize),
    #[error("Invalid chart arguments: {0}")]
    Malformed(String),
}

impl From<ChartValidationError> for ToolError {
    fn from(err: ChartValidationError) -> Self {
        ToolError::invalid_params(err.to_string())
    }
}

pub fn build_chart(request: ChartRequest) -> Result<ChartSpec, ChartValidationError> {
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(ChartValidationError::MissingField("title"))?;
    let kind = request
        .kind
        .ok_or(ChartValidationError::MissingField("kind"))?
        .parse::<ChartKind>()?;
    let labels = request
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| match label {
            Value::String(text) => Ok(text.clone()),
            Value::Number(num) => Ok(num.to_string()),
            _ => Err(ChartValidationError::InvalidLabel(idx)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChartSpec {
        title,
        kind,
        labels,
        series: request.series,
        metrics: request.metrics,
        insights: request.insights,
    })
}

pub fn chart_envelope(spec: &ChartSpec) -> Value {
    serde_json::json!({
        "success": true,
        "message": format!("{} generated", spec.title),
        "chart_data": spec,
    })
}
