//! Server-side HTML surface: renders the layout to markup and tracks live
//! chart instances. Used for previews and as the reference backend.

use super::layout::{ChartConfig, ChartLayout};
use super::slot::Destroy;
use super::{ChartSurface, SurfaceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_layout(layout: &ChartLayout) -> String {
    let mut html = format!("<h2>{}</h2>", escape_html(&layout.title));
    if let Some(kpis) = &layout.kpis {
        html.push_str("<div class=\"metrics\">");
        for card in kpis {
            let trend = serde_json::to_value(card.trend)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "neutral".to_string());
            html.push_str(&format!(
                "<div class=\"metric-card\"><div class=\"metric-label\">{}</div>\
                 <div class=\"metric-value\">{} <span class=\"trend-{}\">{}</span></div></div>",
                escape_html(&card.label),
                escape_html(&card.value),
                trend,
                card.glyph
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("<div class=\"chart-container\"><canvas id=\"chart\"></canvas></div>");
    if let Some(insights) = &layout.insights {
        html.push_str("<div class=\"insights\"><div class=\"insights-title\">Insights</div><ul>");
        for item in insights {
            html.push_str(&format!("<li>{}</li>", escape_html(item)));
        }
        html.push_str("</ul></div>");
    }
    html
}

pub struct HtmlChart {
    live: Arc<AtomicUsize>,
    destroyed: bool,
}

impl Destroy for HtmlChart {
    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct HtmlSurface {
    markup: Option<String>,
    config: Option<String>,
    created: usize,
    live: Arc<AtomicUsize>,
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    /// Config JSON of the most recently created chart.
    pub fn config_json(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl ChartSurface for HtmlSurface {
    type Instance = HtmlChart;

    fn mount(&mut self, layout: &ChartLayout) -> Result<(), SurfaceError> {
        self.markup = Some(render_layout(layout));
        Ok(())
    }

    fn create(&mut self, config: &ChartConfig) -> Result<HtmlChart, SurfaceError> {
        if self.markup.is_none() {
            return Err(SurfaceError::Rejected("no chart area mounted".to_string()));
        }
        let config = serde_json::to_string(config)
            .map_err(|err| SurfaceError::Rejected(err.to_string()))?;
        self.config = Some(config);
        self.created += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(HtmlChart {
            live: self.live.clone(),
            destroyed: false,
        })
    }
}
