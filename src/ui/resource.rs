use crate::constants::ui;
use crate::services::logger::Logger;
use serde_json::Value;
use std::path::Path;

const EMBEDDED_TEMPLATE: &str = include_str!("../../assets/chart_view.html");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    External(String),
}

/// The chart-view HTML served to hosts as an MCP resource.
#[derive(Debug, Clone)]
pub struct ChartViewResource {
    html: String,
    source: TemplateSource,
}

impl ChartViewResource {
    pub fn embedded() -> Self {
        Self {
            html: EMBEDDED_TEMPLATE.to_string(),
            source: TemplateSource::Embedded,
        }
    }

    /// Reads the external template when configured; an unreadable or empty
    /// file falls back to the embedded one.
    pub fn load(path: Option<&Path>, logger: &Logger) -> Self {
        let Some(path) = path else {
            return Self::embedded();
        };
        match std::fs::read_to_string(path) {
            Ok(html) if !html.trim().is_empty() => {
                logger.info(
                    "using external chart template",
                    Some(&serde_json::json!({ "path": path.display().to_string() })),
                );
                Self {
                    html,
                    source: TemplateSource::External(path.display().to_string()),
                }
            }
            Ok(_) => {
                logger.warn(
                    "external chart template is empty, using embedded template",
                    Some(&serde_json::json!({ "path": path.display().to_string() })),
                );
                Self::embedded()
            }
            Err(err) => {
                logger.warn(
                    "external chart template unreadable, using embedded template",
                    Some(&serde_json::json!({
                        "path": path.display().to_string(),
                        "error": err.to_string(),
                    })),
                );
                Self::embedded()
            }
        }
    }

    pub fn uri(&self) -> &'static str {
        ui::CHART_VIEW_URI
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    fn meta() -> Value {
        serde_json::json!({
            "ui": { "csp": { "resourceDomains": ui::RESOURCE_DOMAINS } }
        })
    }

    pub fn descriptor(&self) -> Value {
        serde_json::json!({
            "uri": ui::CHART_VIEW_URI,
            "name": ui::CHART_VIEW_NAME,
            "description": "Interactive chart view for SET_CHART results",
            "mimeType": ui::CHART_VIEW_MIME,
            "_meta": Self::meta(),
        })
    }

    pub fn contents(&self) -> Value {
        serde_json::json!({
            "contents": [{
                "uri": ui::CHART_VIEW_URI,
                "mimeType": ui::CHART_VIEW_MIME,
                "text": self.html,
                "_meta": Self::meta(),
            }]
        })
    }
}
