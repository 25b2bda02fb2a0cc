use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Default)]
struct NormalizationState {
    renamed: Vec<Value>,
    converted: Vec<Value>,
    ignored: Vec<Value>,
}

/// Alternate argument names accepted by every tool.
const COMMON_ALIASES: &[(&str, &str)] = &[
    ("ticker", "symbol"),
    ("tickers", "symbols"),
    ("from", "from_date"),
    ("to", "to_date"),
    ("minId", "min_id"),
];

/// Legacy parameter names of the chart tool.
const CHART_ALIASES: &[(&str, &str)] = &[
    ("titulo", "title"),
    ("tipo", "kind"),
    ("type", "kind"),
    ("metricas", "metrics"),
];

fn rename_key(
    map: &mut Map<String, Value>,
    from_key: &str,
    to_key: &str,
    state: &mut NormalizationState,
    allowed_keys: Option<&HashSet<String>>,
) {
    if !map.contains_key(from_key) {
        return;
    }
    if let Some(allowed) = allowed_keys {
        if !allowed.contains(to_key) {
            return;
        }
    }
    if map.contains_key(to_key) {
        map.remove(from_key);
        state.ignored.push(serde_json::json!({
            "from": from_key,
            "to": to_key,
            "reason": "canonical_already_set",
        }));
        return;
    }
    if let Some(value) = map.remove(from_key) {
        map.insert(to_key.to_string(), value);
        state.renamed.push(serde_json::json!({ "from": from_key, "to": to_key }));
    }
}

/// `"AAPL, MSFT"` becomes `["AAPL", "MSFT"]` for list-typed keys.
fn split_comma_list(map: &mut Map<String, Value>, key: &str, state: &mut NormalizationState) {
    let Some(Value::String(raw)) = map.get(key) else {
        return;
    };
    let items: Vec<Value> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect();
    map.insert(key.to_string(), Value::Array(items));
    state.converted.push(serde_json::json!({ "key": key, "op": "split_comma_list" }));
}

fn compact_state(state: NormalizationState) -> Option<Value> {
    let mut out = Map::new();
    if !state.renamed.is_empty() {
        out.insert("renamed".to_string(), Value::Array(state.renamed));
    }
    if !state.converted.is_empty() {
        out.insert("converted".to_string(), Value::Array(state.converted));
    }
    if !state.ignored.is_empty() {
        out.insert("ignored".to_string(), Value::Array(state.ignored));
    }
    if out.is_empty() {
        None
    } else {
        Some(Value::Object(out))
    }
}

/// Rewrites alternate argument names to the canonical ones declared in the
/// tool's input schema. Returns the rewritten args and a record of what changed.
pub fn normalize_args_aliases(
    args: &Value,
    tool: &str,
    allowed_keys: Option<&HashSet<String>>,
) -> (Value, Option<Value>) {
    let Some(map) = args.as_object() else {
        return (args.clone(), None);
    };
    let mut out = map.clone();
    let mut state = NormalizationState::default();

    for (from, to) in COMMON_ALIASES {
        rename_key(&mut out, from, to, &mut state, allowed_keys);
    }
    if tool == "SET_CHART" {
        for (from, to) in CHART_ALIASES {
            rename_key(&mut out, from, to, &mut state, allowed_keys);
        }
    }
    if tool == "GET_BULK_QUOTES" {
        rename_key(&mut out, "symbol", "symbols", &mut state, allowed_keys);
        split_comma_list(&mut out, "symbols", &mut state);
    }

    (Value::Object(out), compact_state(state))
}
