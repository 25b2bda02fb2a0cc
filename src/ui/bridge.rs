use super::layout::{build_config, build_layout};
use super::slot::ChartSlot;
use super::{ChartSurface, SurfaceError};
use crate::services::chart::ChartSpec;
use crate::services::logger::Logger;
use serde_json::Value;
use std::future::Future;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    NoTextContent,
    NotJson,
    NoChartData,
    MalformedChart(String),
    SurfaceFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Ignored(IgnoreReason),
}

/// Consumes tool-result events one at a time and keeps a single live chart.
pub struct RenderingBridge<S: ChartSurface> {
    logger: Logger,
    surface: S,
    slot: ChartSlot<S::Instance>,
    connected: bool,
    renders: usize,
}

impl<S: ChartSurface> RenderingBridge<S> {
    pub fn new(logger: Logger, surface: S) -> Self {
        Self {
            logger: logger.child("bridge"),
            surface,
            slot: ChartSlot::new(),
            connected: false,
            renders: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn has_chart(&self) -> bool {
        self.slot.is_occupied()
    }

    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Awaits the host handshake. This is the only suspension point before
    /// events start flowing.
    pub async fn connect<F>(&mut self, handshake: F) -> Result<(), SurfaceError>
    where
        F: Future<Output = Result<(), SurfaceError>>,
    {
        handshake.await?;
        self.connected = true;
        self.logger.debug("connected", None);
        Ok(())
    }

    pub fn handle_tool_result(&mut self, event: &Value) -> RenderOutcome {
        match self.try_render(event) {
            Ok(()) => {
                self.renders += 1;
                RenderOutcome::Rendered
            }
            Err(reason) => {
                match &reason {
                    IgnoreReason::MalformedChart(message) | IgnoreReason::SurfaceFailed(message) => {
                        self.logger.warn(
                            "chart event not rendered",
                            Some(&serde_json::json!({ "reason": message })),
                        )
                    }
                    other => self.logger.debug(
                        "tool result ignored",
                        Some(&serde_json::json!({ "reason": format!("{:?}", other) })),
                    ),
                }
                RenderOutcome::Ignored(reason)
            }
        }
    }

    fn try_render(&mut self, event: &Value) -> Result<(), IgnoreReason> {
        let text = event
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            })
            .and_then(|block| block.get("text"))
            .and_then(|t| t.as_str())
            .ok_or(IgnoreReason::NoTextContent)?;
        let payload: Value = serde_json::from_str(text).map_err(|_| IgnoreReason::NotJson)?;
        let chart_data = payload
            .get("chart_data")
            .filter(|v| !v.is_null())
            .ok_or(IgnoreReason::NoChartData)?;
        let spec: ChartSpec = serde_json::from_value(chart_data.clone())
            .map_err(|err| IgnoreReason::MalformedChart(err.to_string()))?;

        let layout = build_layout(&spec);
        let config = build_config(&spec);
        // A failed mount leaves the live chart in place.
        self.surface
            .mount(&layout)
            .map_err(|err| IgnoreReason::SurfaceFailed(err.to_string()))?;
        let surface = &mut self.surface;
        self.slot
            .replace_with(|| surface.create(&config))
            .map_err(|err| IgnoreReason::SurfaceFailed(err.to_string()))
    }

    /// Processes events until the sender side closes, then tears down.
    pub async fn run(&mut self, mut events: mpsc::Receiver<Value>) -> usize {
        if !self.connected {
            self.logger.warn("event loop started before connect", None);
        }
        while let Some(event) = events.recv().await {
            self.handle_tool_result(&event);
        }
        self.teardown();
        self.renders
    }

    pub fn teardown(&mut self) {
        self.slot.teardown();
    }
}
