mod common;

use common::{server_with, test_settings, FakeSource};
use finsage::services::logger::{LogLevel, Logger};
use finsage::ui::markup::HtmlSurface;
use finsage::ui::{
    ChartConfig, ChartLayout, ChartSurface, Destroy, IgnoreReason, RenderOutcome, RenderingBridge,
    SurfaceError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

fn chart_event(title: &str) -> Value {
    let payload = json!({
        "success": true,
        "message": format!("{} generated", title),
        "chart_data": {
            "title": title,
            "kind": "line",
            "labels": ["Jan", "Feb"],
            "series": [{ "name": "Revenue", "values": [1, 2] }],
            "metrics": [{ "label": "Growth", "value": "12%", "trend": "up" }],
            "insights": []
        }
    });
    json!({ "content": [{ "type": "text", "text": payload.to_string() }] })
}

fn verbose_logger() -> Logger {
    let mut logger = Logger::new("test");
    logger.set_level(LogLevel::Debug);
    logger
}

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingChart {
    id: usize,
    journal: Journal,
}

impl Destroy for RecordingChart {
    fn destroy(&mut self) {
        self.journal.push(format!("destroy {}", self.id));
    }
}

#[derive(Default)]
struct RecordingSurface {
    journal: Journal,
    next_id: usize,
    mounts: usize,
    fail_mount_at: Option<usize>,
}

impl ChartSurface for RecordingSurface {
    type Instance = RecordingChart;

    fn mount(&mut self, layout: &ChartLayout) -> Result<(), SurfaceError> {
        self.mounts += 1;
        if self.fail_mount_at == Some(self.mounts) {
            return Err(SurfaceError::Rejected("canvas lost".to_string()));
        }
        self.journal.push(format!("mount {}", layout.title));
        Ok(())
    }

    fn create(&mut self, config: &ChartConfig) -> Result<RecordingChart, SurfaceError> {
        self.next_id += 1;
        self.journal
            .push(format!("create {} ({} datasets)", self.next_id, config.data.datasets.len()));
        Ok(RecordingChart {
            id: self.next_id,
            journal: self.journal.clone(),
        })
    }
}

#[test]
fn second_render_destroys_first_instance_before_creating() {
    let surface = RecordingSurface::default();
    let journal = surface.journal.clone();
    let mut bridge = RenderingBridge::new(verbose_logger(), surface);

    assert_eq!(bridge.handle_tool_result(&chart_event("First")), RenderOutcome::Rendered);
    assert_eq!(bridge.handle_tool_result(&chart_event("Second")), RenderOutcome::Rendered);
    assert_eq!(
        journal.entries(),
        vec![
            "mount First",
            "create 1 (1 datasets)",
            "mount Second",
            "destroy 1",
            "create 2 (1 datasets)",
        ]
    );

    drop(bridge);
    assert_eq!(journal.entries().last().map(String::as_str), Some("destroy 2"));
}

#[test]
fn failed_mount_keeps_the_live_chart() {
    let surface = RecordingSurface {
        fail_mount_at: Some(2),
        ..RecordingSurface::default()
    };
    let journal = surface.journal.clone();
    let mut bridge = RenderingBridge::new(verbose_logger(), surface);

    assert_eq!(bridge.handle_tool_result(&chart_event("First")), RenderOutcome::Rendered);
    let outcome = bridge.handle_tool_result(&chart_event("Second"));
    assert_eq!(
        outcome,
        RenderOutcome::Ignored(IgnoreReason::SurfaceFailed(
            "surface rejected the chart: canvas lost".to_string()
        ))
    );
    assert!(bridge.has_chart());
    assert_eq!(bridge.renders(), 1);
    assert_eq!(journal.entries(), vec!["mount First", "create 1 (1 datasets)"]);

    assert_eq!(bridge.handle_tool_result(&chart_event("Third")), RenderOutcome::Rendered);
    assert_eq!(
        journal.entries()[2..].to_vec(),
        vec!["mount Third", "destroy 1", "create 2 (1 datasets)"]
    );
}

#[test]
fn html_surface_keeps_exactly_one_live_chart() {
    let mut bridge = RenderingBridge::new(verbose_logger(), HtmlSurface::new());
    bridge.handle_tool_result(&chart_event("Ventas Q1"));
    bridge.handle_tool_result(&chart_event("Ventas Q2"));

    assert_eq!(bridge.surface().created(), 2);
    assert_eq!(bridge.surface().live_instances(), 1);
    let markup = bridge.surface().markup().expect("markup");
    assert!(markup.contains("<h2>Ventas Q2</h2>"));
    assert!(markup.contains("↑"));
    assert!(!markup.contains("insights-title"));

    bridge.teardown();
    assert_eq!(bridge.surface().live_instances(), 0);
    assert!(!bridge.has_chart());
}

#[test]
fn unrelated_events_are_ignored_silently() {
    let logger = verbose_logger();
    let mut bridge = RenderingBridge::new(logger.clone(), HtmlSurface::new());

    let quote = json!({ "symbol": "AAPL", "current_price": 189.5 });
    let outcome = bridge.handle_tool_result(&json!({
        "content": [{ "type": "text", "text": quote.to_string() }]
    }));
    assert_eq!(outcome, RenderOutcome::Ignored(IgnoreReason::NoChartData));

    let outcome = bridge.handle_tool_result(&json!({
        "content": [{ "type": "text", "text": "plain words, not JSON" }]
    }));
    assert_eq!(outcome, RenderOutcome::Ignored(IgnoreReason::NotJson));

    let outcome = bridge.handle_tool_result(&json!({
        "content": [{ "type": "image", "data": "..." }]
    }));
    assert_eq!(outcome, RenderOutcome::Ignored(IgnoreReason::NoTextContent));

    assert_eq!(bridge.renders(), 0);
    assert_eq!(bridge.surface().created(), 0);
    let stats = logger.stats();
    assert_eq!(stats["warn"], 0);
    assert_eq!(stats["error"], 0);
}

#[test]
fn malformed_chart_keeps_previous_chart_untouched() {
    let mut bridge = RenderingBridge::new(verbose_logger(), HtmlSurface::new());
    bridge.handle_tool_result(&chart_event("Good"));
    let bad = json!({ "chart_data": { "title": "Bad", "kind": "scatter" } });
    let outcome = bridge.handle_tool_result(&json!({
        "content": [{ "type": "text", "text": bad.to_string() }]
    }));
    assert!(matches!(outcome, RenderOutcome::Ignored(IgnoreReason::MalformedChart(_))));
    assert!(bridge.has_chart());
    assert_eq!(bridge.surface().live_instances(), 1);
}

#[test]
fn legacy_payload_field_names_render() {
    let mut bridge = RenderingBridge::new(verbose_logger(), HtmlSurface::new());
    let legacy = json!({
        "chart_data": {
            "titulo": "Ventas", "tipo": "bar", "labels": ["Q1"],
            "series": [{ "nombre": "Ingresos", "valores": [10] }],
            "metricas": [{ "label": "Total", "valor": 10, "tendencia": "down" }]
        }
    });
    let outcome = bridge.handle_tool_result(&json!({
        "content": [{ "type": "text", "text": legacy.to_string() }]
    }));
    assert_eq!(outcome, RenderOutcome::Rendered);
    assert!(bridge.surface().markup().unwrap_or_default().contains("↓"));
}

#[tokio::test]
async fn bridge_consumes_tool_results_after_handshake() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let mut bridge = RenderingBridge::new(verbose_logger(), HtmlSurface::new());
    bridge.connect(async { Ok(()) }).await.expect("handshake");
    assert!(bridge.is_connected());

    let (tx, rx) = mpsc::channel(8);
    let chart = server
        .handle_tools_call(
            "SET_CHART",
            json!({ "title": "Ventas Q1", "kind": "bar", "labels": ["Q1", "Q2", "Q3"],
                    "series": [{ "name": "Ingresos", "values": [10, 20, 30] }] }),
        )
        .await
        .expect("chart result");
    let other = server
        .handle_tools_call("SET_CHART", json!({ "title": "x", "kind": "scatter", "labels": [], "series": [] }))
        .await
        .expect("error result");
    tx.send(chart.clone()).await.expect("send");
    tx.send(other).await.expect("send");
    tx.send(chart).await.expect("send");
    drop(tx);

    let renders = bridge.run(rx).await;
    assert_eq!(renders, 2);
    assert_eq!(bridge.surface().created(), 2);
    assert_eq!(bridge.surface().live_instances(), 0);
}

#[tokio::test]
async fn failed_handshake_leaves_bridge_disconnected() {
    let mut bridge = RenderingBridge::new(verbose_logger(), HtmlSurface::new());
    let err = bridge
        .connect(async { Err(SurfaceError::NotConnected) })
        .await
        .expect_err("handshake fails");
    assert_eq!(err, SurfaceError::NotConnected);
    assert!(!bridge.is_connected());
}
