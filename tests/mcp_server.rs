mod common;

use common::{result_text_json, server_with, test_settings, FakeSource};
use finsage::mcp::protocol::JsonRpcRequest;
use serde_json::{json, Value};
use std::sync::Arc;

fn request(value: Value) -> JsonRpcRequest {
    serde_json::from_value(value).expect("request")
}

async fn call(server: &finsage::mcp::server::McpServer, method: &str, params: Value) -> Value {
    let response = server
        .handle_request(request(json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params })))
        .await
        .expect("response");
    serde_json::to_value(&response).expect("serialize")
}

#[tokio::test]
async fn initialize_advertises_tools_and_resources() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let response = call(&server, "initialize", json!({})).await;
    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert_eq!(result["serverInfo"]["name"], "finsage");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
}

#[tokio::test]
async fn tools_list_exposes_full_catalog() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let response = call(&server, "tools/list", json!({})).await;
    let tools = response["result"]["tools"].as_array().expect("tools");
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    for expected in [
        "GET_MARKET_NEWS",
        "GET_COMPANY_NEWS",
        "GET_EARNINGS_CALENDAR",
        "GET_QUOTE",
        "GET_BULK_QUOTES",
        "GET_BASIC_FINANCIALS",
        "GET_EARNING_SURPRISES",
        "SET_CHART",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
    let chart = tools.iter().find(|t| t["name"] == "SET_CHART").expect("chart");
    assert_eq!(chart["_meta"]["ui"]["resourceUri"], "ui://finsage/chart-view.html");
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error_with_suggestion() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let response = call(&server, "tools/call", json!({ "name": "GET_QOUTE", "arguments": {} })).await;
    assert_eq!(response["error"]["code"], -32602);
    let message = response["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("Unknown tool: GET_QOUTE"));
    assert!(message.contains("Did you mean: GET_QUOTE"));
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn upstream_failure_becomes_error_result_not_protocol_error() {
    let source = Arc::new(FakeSource::new().status("quote", Some("AAPL"), 401, "Invalid API key"));
    let server = server_with(source, test_settings());
    let response = call(&server, "tools/call", json!({ "name": "GET_QUOTE", "arguments": { "symbol": "aapl" } })).await;
    assert!(response.get("error").is_none());
    let result = &response["result"];
    assert_eq!(result["isError"], true);
    assert_eq!(result_text_json(result), json!({ "error": "Finnhub Error 401: Invalid API key" }));
}

#[tokio::test]
async fn quote_uses_requested_symbol_and_nulls_missing_fields() {
    let source = Arc::new(FakeSource::new().ok("quote", Some("TSLA"), json!({ "c": 251.05, "t": 0 })));
    let server = server_with(source, test_settings());
    let result = server
        .handle_tools_call("GET_QUOTE", json!({ "ticker": "tsla" }))
        .await
        .expect("tool result");
    let quote = &result["structuredContent"];
    assert_eq!(quote["symbol"], "TSLA");
    assert_eq!(quote["current_price"], 251.05);
    assert!(quote["timestamp"].is_null());
    assert!(quote["high"].is_null());
    assert!(quote.as_object().expect("object").contains_key("previous_close"));
}

#[tokio::test]
async fn market_news_skips_min_id_floor_of_zero() {
    let source = Arc::new(FakeSource::new().ok(
        "news",
        None,
        json!([{
            "id": 42, "category": "crypto", "headline": "Bitcoin â€“ rally", "summary": "s",
            "source": "Reuters", "url": "https://example.com", "image": "", "related": "",
            "datetime": 1_700_000_000
        }]),
    ));
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call("GET_MARKET_NEWS", json!({ "category": "crypto" }))
        .await
        .expect("tool result");
    let payload = &result["structuredContent"];
    assert_eq!(payload["category"], "crypto");
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["news"][0]["headline"], "Bitcoin \u{2013} rally");
    assert_eq!(payload["news"][0]["datetime"], "2023-11-14T22:13:20Z");

    let calls = source.calls();
    assert_eq!(calls[0].get("category"), Some("crypto"));
    assert_eq!(calls[0].get("minId"), None);

    server
        .handle_tools_call("GET_MARKET_NEWS", json!({ "min_id": 7 }))
        .await
        .expect("tool result");
    let calls = source.calls();
    assert_eq!(calls[1].get("minId"), Some("7"));
    assert_eq!(calls[1].get("category"), Some("general"));
}

#[tokio::test]
async fn company_news_accepts_date_aliases_and_validates_order() {
    let source = Arc::new(FakeSource::new().ok("company-news", Some("AAPL"), json!([])));
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call(
            "GET_COMPANY_NEWS",
            json!({ "symbol": "aapl", "from": "2024-01-01", "to": "2024-01-31" }),
        )
        .await
        .expect("tool result");
    assert_eq!(
        result["structuredContent"],
        json!({ "symbol": "AAPL", "from": "2024-01-01", "to": "2024-01-31", "count": 0, "news": [] })
    );

    let result = server
        .handle_tools_call(
            "GET_COMPANY_NEWS",
            json!({ "symbol": "aapl", "from_date": "2024-02-01", "to_date": "2024-01-01" }),
        )
        .await
        .expect("tool result");
    assert_eq!(result["isError"], true);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn earnings_calendar_unwraps_and_sends_international_only_when_set() {
    let source = Arc::new(FakeSource::new().ok(
        "calendar/earnings",
        None,
        json!({ "earningsCalendar": [{
            "date": "2024-01-25", "symbol": "TSLA", "hour": "amc", "quarter": 4, "year": 2023,
            "epsActual": 0.71, "epsEstimate": 0.74
        }] }),
    ));
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call("GET_EARNINGS_CALENDAR", json!({ "from_date": "2024-01-22", "to_date": "2024-01-26" }))
        .await
        .expect("tool result");
    let payload = &result["structuredContent"];
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["symbol"], Value::Null);
    assert_eq!(payload["earnings"][0]["eps_estimate"], 0.74);
    assert!(payload["earnings"][0]["revenue_actual"].is_null());
    assert_eq!(source.calls()[0].get("international"), None);

    server
        .handle_tools_call("GET_EARNINGS_CALENDAR", json!({ "international": true }))
        .await
        .expect("tool result");
    assert_eq!(source.calls()[1].get("international"), Some("true"));
}

#[tokio::test]
async fn earnings_calendar_rejects_inverted_range_before_fetching() {
    let source = Arc::new(FakeSource::new());
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call(
            "GET_EARNINGS_CALENDAR",
            json!({ "from_date": "2024-02-01", "to_date": "2024-01-01" }),
        )
        .await
        .expect("tool result");
    assert_eq!(result["isError"], true);
    assert_eq!(
        result["structuredContent"],
        json!({ "error": "from_date must not be after to_date" })
    );
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn basic_financials_default_metric_and_empty_maps() {
    let source = Arc::new(FakeSource::new().ok("stock/metric", Some("NVDA"), json!({ "metricType": "all" })));
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call("GET_BASIC_FINANCIALS", json!({ "symbol": "nvda" }))
        .await
        .expect("tool result");
    assert_eq!(
        result["structuredContent"],
        json!({ "symbol": "NVDA", "metric_type": "all", "metric": {}, "series": {} })
    );
    assert_eq!(source.calls()[0].get("metric"), Some("all"));
}

#[tokio::test]
async fn earning_surprises_pass_limit() {
    let source = Arc::new(FakeSource::new().ok(
        "stock/earnings",
        Some("AAPL"),
        json!([{ "symbol": "AAPL", "period": "2023-09-30", "actual": 1.46, "estimate": 1.39, "surprisePercent": 5.036 }]),
    ));
    let server = server_with(source.clone(), test_settings());
    let result = server
        .handle_tools_call("GET_EARNING_SURPRISES", json!({ "symbol": "AAPL", "limit": 4 }))
        .await
        .expect("tool result");
    assert_eq!(result["structuredContent"]["earnings"][0]["surprise_percent"], 5.036);
    assert_eq!(source.calls()[0].get("limit"), Some("4"));
}

#[tokio::test]
async fn set_chart_emits_unescaped_payload() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let result = server
        .handle_tools_call(
            "SET_CHART",
            json!({
                "title": "Ingresos por región",
                "kind": "bar",
                "labels": ["Q1", "Q2", "Q3"],
                "series": [{ "name": "Ingresos", "values": [10, 20, 30] }]
            }),
        )
        .await
        .expect("tool result");
    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().expect("text");
    assert!(text.contains("Ingresos por región generated"));
    assert!(!text.contains("\\u"));
    let payload = result_text_json(&result);
    assert_eq!(payload["chart_data"]["series"][0]["values"], json!([10, 20, 30]));
}

#[tokio::test]
async fn set_chart_rejects_unknown_kind_without_chart_data() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let result = server
        .handle_tools_call(
            "SET_CHART",
            json!({ "title": "t", "kind": "scatter", "labels": [], "series": [] }),
        )
        .await
        .expect("tool result");
    assert_eq!(result["isError"], true);
    let payload = result_text_json(&result);
    assert!(payload.get("chart_data").is_none());
    assert!(payload["error"].as_str().unwrap_or_default().contains("/kind"));
}

#[tokio::test]
async fn resources_list_and_read_serve_chart_view() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let listed = call(&server, "resources/list", json!({})).await;
    assert_eq!(listed["result"]["resources"][0]["uri"], "ui://finsage/chart-view.html");

    let read = call(&server, "resources/read", json!({ "uri": "ui://finsage/chart-view.html" })).await;
    let contents = &read["result"]["contents"][0];
    assert_eq!(contents["mimeType"], "text/html;profile=mcp-app");
    assert!(contents["text"].as_str().unwrap_or_default().contains("<canvas"));

    let missing = call(&server, "resources/read", json!({ "uri": "ui://finsage/other.html" })).await;
    assert_eq!(missing["error"]["code"], -32002);
}

#[tokio::test]
async fn notifications_get_no_response_and_unknown_methods_fail() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let none = server
        .handle_request(request(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })))
        .await;
    assert!(none.is_none());

    let response = call(&server, "prompts/list", json!({})).await;
    assert_eq!(response["error"]["code"], -32601);
    let pong = call(&server, "ping", json!({})).await;
    assert_eq!(pong["result"], json!({}));
}

#[tokio::test]
async fn serve_handles_line_stream() {
    let server = server_with(Arc::new(FakeSource::new()), test_settings());
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
        "\n",
        "not json\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"SET_CHART\",\"arguments\":{\"title\":\"Año\",\"kind\":\"pie\",\"labels\":[],\"series\":[]}}}\n"
    );
    let mut output: Vec<u8> = Vec::new();
    server
        .serve(input.as_bytes(), &mut output)
        .await
        .expect("serve");

    let text = String::from_utf8(output).expect("utf8");
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["result"]["structuredContent"]["message"], "Año generated");
}
