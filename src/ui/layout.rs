use crate::constants::ui::PALETTE;
use crate::services::chart::{ChartKind, ChartSpec, Trend};
use serde::Serialize;
use serde_json::Number;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Number>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u8,
    pub fill: bool,
    pub tension: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Widget configuration, shaped like a Chart.js config object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: String,
    pub value: String,
    pub trend: Trend,
    pub glyph: &'static str,
}

/// Everything around the chart canvas. Sections with no source data are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub kpis: Option<Vec<KpiCard>>,
    pub insights: Option<Vec<String>>,
}

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn build_config(spec: &ChartSpec) -> ChartConfig {
    let datasets = spec
        .series
        .iter()
        .enumerate()
        .map(|(idx, series)| {
            let color = series
                .color
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| palette_color(idx).to_string());
            let label = if series.name.trim().is_empty() {
                format!("Series {}", idx + 1)
            } else {
                series.name.clone()
            };
            Dataset {
                label,
                data: series.values.clone(),
                background_color: color.clone(),
                border_color: color,
                border_width: 2,
                fill: false,
                tension: 0.3,
            }
        })
        .collect();

    ChartConfig {
        kind: spec.kind,
        data: ChartData {
            labels: spec.labels.clone(),
            datasets,
        },
        options: serde_json::json!({
            "responsive": true,
            "maintainAspectRatio": true,
            "plugins": {
                "legend": { "position": "top" },
                "title": { "display": false }
            }
        }),
    }
}

pub fn build_layout(spec: &ChartSpec) -> ChartLayout {
    let kpis = (!spec.metrics.is_empty()).then(|| {
        spec.metrics
            .iter()
            .map(|metric| KpiCard {
                label: metric.label.clone(),
                value: metric.value.to_string(),
                trend: metric.trend,
                glyph: metric.trend.glyph(),
            })
            .collect()
    });
    let insights = (!spec.insights.is_empty()).then(|| spec.insights.clone());
    ChartLayout {
        title: spec.title.clone(),
        kpis,
        insights,
    }
}
